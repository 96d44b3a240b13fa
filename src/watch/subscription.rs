// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod watch subscription backed by a reflector store.

use crate::error::{InformerError, Result};
use crate::types::ResourceKey;
use crate::watch::bridge::EventBridgeHandle;
use crate::watch::events::EventClassifier;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    runtime::{
        reflector::{self, store::Writer, Store},
        watcher, WatchStreamExt,
    },
    Api, Client,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Read access to the latest known state of every watched pod
pub trait PodCache: Send + Sync {
    /// `Ok(None)` means the pod is gone
    fn get_by_key(&self, key: &ResourceKey) -> Result<Option<Arc<Pod>>>;
}

impl PodCache for Store<Pod> {
    fn get_by_key(&self, key: &ResourceKey) -> Result<Option<Arc<Pod>>> {
        Ok(self.get(&key.to_object_ref()))
    }
}

/// Watches pods, keeps the reflector store current and forwards classified
/// events to the event bridge. Reconnects are handled by the watcher backoff.
pub struct Subscription {
    api: Api<Pod>,
    writer: Writer<Pod>,
    bridge: EventBridgeHandle,
}

impl Subscription {
    /// Create a subscription for one namespace, or all when `namespace` is `None`
    pub fn new(
        client: Client,
        namespace: Option<&str>,
        bridge: EventBridgeHandle,
    ) -> (Self, Store<Pod>) {
        let api = match namespace {
            Some(ns) => Api::namespaced(client, ns),
            None => Api::all(client),
        };
        let (store, writer) = reflector::store();

        (Self { api, writer, bridge }, store)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let Self { api, writer, bridge } = self;
        let mut classifier = EventClassifier::default();

        info!("Starting pod watch");
        let stream = watcher(api, watcher::Config::default())
            .default_backoff()
            .reflect(writer);
        futures::pin_mut!(stream);

        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => {
                    for pod_event in classifier.classify(event) {
                        bridge.send(pod_event).await;
                    }
                }
                Err(e) => warn!("Pod watch error: {}", e),
            }
        }

        warn!("Pod watch stream ended");
        Ok(())
    }
}

/// Wait until the store holds the initial list of pods
#[instrument(skip(store))]
pub async fn wait_for_initial_sync(store: &Store<Pod>) -> Result<()> {
    store
        .wait_until_ready()
        .await
        .map_err(|e| InformerError::CacheSyncError(format!("Timed out waiting for caches to sync: {}", e)))?;
    info!("Pod cache synced, {} pods known", store.state().len());
    Ok(())
}
