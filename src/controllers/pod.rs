// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod controller - wires the watch, the event bridge, the work queue and
//! the reconciliation workers together.

use crate::config::Config;
use crate::kubernetes::PodLogs;
use crate::notify::Notifier;
use crate::queue::WorkQueue;
use crate::reconcilers::PodReconciler;
use crate::watch::{wait_for_initial_sync, EventBridge, Subscription};
use kube::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

pub struct PodController {
    client: Client,
    config: Config,
    notifier: Arc<dyn Notifier>,
}

impl PodController {
    pub fn new(client: Client, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            config,
            notifier,
        }
    }

    /// Run until `shutdown` resolves. In-flight reconciliations finish before
    /// this returns; queued keys are abandoned.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        let queue = WorkQueue::with_default_rate_limiter();
        let (bridge, bridge_handle) = EventBridge::new(queue.clone());
        let (subscription, store) = Subscription::new(
            self.client.clone(),
            self.config.namespace.as_deref(),
            bridge_handle,
        );

        info!("Starting Pod controller");
        let bridge_task = tokio::spawn(bridge.run());
        let subscription_task = tokio::spawn(subscription.run());

        tokio::pin!(shutdown);
        tokio::select! {
            synced = wait_for_initial_sync(&store) => synced?,
            _ = &mut shutdown => {
                info!("Shutdown requested before the pod cache synced");
                subscription_task.abort();
                bridge_task.abort();
                queue.shut_down();
                return Ok(());
            }
        }

        let reconciler = Arc::new(PodReconciler::new(
            queue.clone(),
            Arc::new(store),
            self.notifier,
            Arc::new(PodLogs::new(self.client)),
        ));
        let mut workers = spawn_workers(reconciler, self.config.threadiness);

        shutdown.await;
        info!("Stopping Pod controller");

        subscription_task.abort();
        bridge_task.abort();
        queue.shut_down();
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!("Worker terminated abnormally: {}", e);
            }
        }

        info!("All workers stopped");
        Ok(())
    }
}

/// Start `threadiness` independent workers sharing one reconciler
pub fn spawn_workers(reconciler: Arc<PodReconciler>, threadiness: usize) -> JoinSet<()> {
    let mut workers = JoinSet::new();
    for _ in 0..threadiness {
        workers.spawn(Arc::clone(&reconciler).run_worker());
    }
    info!("Started {} workers", threadiness);
    workers
}
