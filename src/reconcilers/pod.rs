// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod reconciler - pops keys off the work queue, detects crash loops and
//! alerts on them, with all retry policy in one error handler.

use crate::constants::{DEFAULT_NOTIFY_WINDOW_SECS, MAX_RETRIES};
use crate::error::{InformerError, Result};
use crate::notify::{crash_alert, LogSource, Notifier};
use crate::queue::WorkQueue;
use crate::reconcilers::debounce::NotificationDebouncer;
use crate::types::{PodCrashExt, ResourceKey};
use crate::watch::PodCache;
use k8s_openapi::api::core::v1::ContainerStatus;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

pub struct PodReconciler {
    queue: WorkQueue<ResourceKey>,
    cache: Arc<dyn PodCache>,
    notifier: Arc<dyn Notifier>,
    logs: Arc<dyn LogSource>,
    debouncer: NotificationDebouncer,
    default_window: Duration,
}

/// Marks a key done on the queue when processing ends, whatever the outcome
struct InFlight<'a> {
    queue: &'a WorkQueue<ResourceKey>,
    key: &'a ResourceKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.queue.done(self.key);
    }
}

impl PodReconciler {
    pub fn new(
        queue: WorkQueue<ResourceKey>,
        cache: Arc<dyn PodCache>,
        notifier: Arc<dyn Notifier>,
        logs: Arc<dyn LogSource>,
    ) -> Self {
        Self {
            queue,
            cache,
            notifier,
            logs,
            debouncer: NotificationDebouncer::new(),
            default_window: Duration::from_secs(DEFAULT_NOTIFY_WINDOW_SECS),
        }
    }

    /// Process keys until the queue shuts down
    pub async fn run_worker(self: Arc<Self>) {
        while self.process_next_item().await {}
    }

    /// Handle one key. Returns `false` once the queue has shut down.
    pub async fn process_next_item(&self) -> bool {
        let Some(key) = self.queue.get().await else {
            return false;
        };
        let _in_flight = InFlight {
            queue: &self.queue,
            key: &key,
        };

        let result = self.reconcile(&key).await;
        self.handle_err(result, &key);
        true
    }

    #[instrument(skip(self, key), fields(pod = %key))]
    async fn reconcile(&self, key: &ResourceKey) -> Result<()> {
        let pod = self.cache.get_by_key(key).map_err(|e| {
            error!("Fetching pod {} from store failed: {}", key, e);
            e
        })?;

        let Some(pod) = pod else {
            info!("Pod {} does not exist anymore", key);
            self.debouncer.clear_timeout(key);
            return Ok(());
        };

        debug!("Received create/update/delete for pod {}", key);

        if !pod.is_inform_enabled() {
            return Ok(());
        }
        let window = pod.notify_window(self.default_window);

        for container in pod.crash_looping_containers() {
            if !self.debouncer.should_notify(key, window) {
                debug!(
                    "Container {} of pod {} is crash looping, alert suppressed for {}s",
                    container.name,
                    key,
                    window.as_secs()
                );
                continue;
            }
            self.send_crash_notification(key, container).await?;
        }

        Ok(())
    }

    async fn send_crash_notification(&self, key: &ResourceKey, container: &ContainerStatus) -> Result<()> {
        let alert = crash_alert(self.logs.as_ref(), key, container).await;

        if let Err(e) = self.notifier.send_alert(&alert).await {
            // The alert never went out, so the retry must not be debounced
            self.debouncer.clear_timeout(key);
            error!("Failed to send crash alert for pod {}: {}", key, e);
            return Err(e);
        }

        info!("Sent crash loop alert for container {} of pod {}", container.name, key);
        Ok(())
    }

    /// The only place failures are retried: bounded, rate limited requeues
    fn handle_err(&self, result: Result<()>, key: &ResourceKey) {
        let Err(e) = result else {
            self.queue.forget(key);
            return;
        };

        if self.queue.num_requeues(key) < MAX_RETRIES {
            info!("Error syncing pod {}: {}", key, e);
            self.queue.add_rate_limited(key.clone());
            return;
        }

        self.queue.forget(key);
        report_dropped(key, &e);
    }
}

/// Surface a key that exhausted its retries
fn report_dropped(key: &ResourceKey, error: &InformerError) {
    error!(
        "Dropping pod {} out of the queue after {} retries: {}",
        key, MAX_RETRIES, error
    );
}
