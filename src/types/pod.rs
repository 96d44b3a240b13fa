// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Crash loop classification and per-pod annotation settings.

use crate::constants::{annotations, CRASH_LOOP_REASON};
use crate::error::{InformerError, Result};
use k8s_openapi::api::core::v1::{ContainerStatus, Pod};
use kube::ResourceExt;
use std::time::Duration;
use tracing::warn;

pub trait PodCrashExt {
    /// Whether the pod opted in to crash loop alerts
    fn is_inform_enabled(&self) -> bool;

    /// Debounce window override from the backoff annotation, if present
    fn notify_window_override(&self) -> Result<Option<Duration>>;

    /// Debounce window for this pod, falling back to `default` when the
    /// override is absent or malformed
    fn notify_window(&self, default: Duration) -> Duration;

    /// Container statuses that currently classify as crash looping
    fn crash_looping_containers(&self) -> Vec<&ContainerStatus>;
}

impl PodCrashExt for Pod {
    fn is_inform_enabled(&self) -> bool {
        self.annotations()
            .get(annotations::ENABLED)
            .is_some_and(|v| v == annotations::INFORM)
    }

    fn notify_window_override(&self) -> Result<Option<Duration>> {
        let Some(raw) = self.annotations().get(annotations::BACKOFF) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        raw.trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| {
                InformerError::InvalidAnnotation(format!(
                    "{}={:?} is not a number of seconds: {}",
                    annotations::BACKOFF,
                    raw,
                    e
                ))
            })
    }

    fn notify_window(&self, default: Duration) -> Duration {
        match self.notify_window_override() {
            Ok(Some(window)) => window,
            Ok(None) => default,
            Err(e) => {
                warn!(
                    "Pod {}/{}: {}, using default window of {}s",
                    self.namespace().unwrap_or_default(),
                    self.name_any(),
                    e,
                    default.as_secs()
                );
                default
            }
        }
    }

    fn crash_looping_containers(&self) -> Vec<&ContainerStatus> {
        self.status
            .as_ref()
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| statuses.iter().filter(|c| is_crash_looping(c)).collect())
            .unwrap_or_default()
    }
}

/// A container is crash looping when it is not ready and waiting with the
/// kubelet's crash-restart backoff reason
pub fn is_crash_looping(container: &ContainerStatus) -> bool {
    !container.ready
        && container
            .state
            .as_ref()
            .and_then(|s| s.waiting.as_ref())
            .and_then(|w| w.reason.as_deref())
            .is_some_and(|reason| reason == CRASH_LOOP_REASON)
}

/// Reason of the container's last termination, if it terminated before
pub fn last_termination_reason(container: &ContainerStatus) -> Option<&str> {
    container
        .last_state
        .as_ref()
        .and_then(|s| s.terminated.as_ref())
        .map(|t| t.reason.as_deref().unwrap_or_default())
}
