// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Feeds pod lifecycle events into the work queue as keys.

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::queue::WorkQueue;
use crate::types::ResourceKey;
use crate::watch::events::PodEvent;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Consumes pod events on its own task and enqueues their keys.
/// Performs no business logic; the reconciler reads current state itself.
pub struct EventBridge {
    queue: WorkQueue<ResourceKey>,
    event_rx: mpsc::Receiver<PodEvent>,
}

/// Handle the watch subscription uses to deliver events to the bridge
#[derive(Clone)]
pub struct EventBridgeHandle {
    event_tx: mpsc::Sender<PodEvent>,
}

impl EventBridgeHandle {
    pub async fn send(&self, event: PodEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            error!("Failed to send event to EventBridge: {}", e);
        }
    }
}

impl EventBridge {
    pub fn new(queue: WorkQueue<ResourceKey>) -> (Self, EventBridgeHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let bridge = Self { queue, event_rx };
        let handle = EventBridgeHandle { event_tx };
        (bridge, handle)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("EventBridge started, listening for pod events...");

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(&event);
        }

        info!("EventBridge stopped, all senders dropped");
        Ok(())
    }

    fn handle_event(&self, event: &PodEvent) {
        let key = event.key();
        match event {
            PodEvent::Created(_) => debug!("Pod {} created", key),
            PodEvent::Updated(_) => debug!("Pod {} updated", key),
            PodEvent::Deleted(_) => debug!("Pod {} deleted", key),
        }
        self.queue.add(key);
    }
}
