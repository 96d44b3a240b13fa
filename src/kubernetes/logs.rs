// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Container log retrieval through the API server

use crate::constants::alert::LOG_TAIL_LINES;
use crate::error::Result;
use crate::notify::LogSource;
use crate::types::ResourceKey;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{api::LogParams, Api, Client};
use tracing::instrument;

pub struct PodLogs {
    client: Client,
}

impl PodLogs {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogSource for PodLogs {
    #[instrument(skip(self, key), fields(pod = %key))]
    async fn container_logs(&self, key: &ResourceKey, container: &str) -> Result<String> {
        let pods: Api<Pod> = match key.namespace() {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::default_namespaced(self.client.clone()),
        };
        let params = LogParams {
            container: Some(container.to_string()),
            tail_lines: Some(LOG_TAIL_LINES),
            ..Default::default()
        };

        Ok(pods.logs(key.name(), &params).await?)
    }
}
