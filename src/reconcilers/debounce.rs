// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-pod cool-down between two crash loop alerts.

use crate::types::ResourceKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Remembers when each pod was last alerted on. A passed check restarts the
/// window, so this is a reset-on-pass limiter rather than a rolling window.
#[derive(Default)]
pub struct NotificationDebouncer {
    last_sent: Mutex<HashMap<ResourceKey, Instant>>,
}

impl NotificationDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alert for `key` may go out now. Records the alert time when it may.
    pub fn should_notify(&self, key: &ResourceKey, window: Duration) -> bool {
        let now = Instant::now();
        let mut last_sent = self.last_sent.lock();

        if let Some(last) = last_sent.get(key) {
            if now.duration_since(*last) < window {
                return false;
            }
        }
        last_sent.insert(key.clone(), now);
        true
    }

    /// Forget the last alert time of `key`
    pub fn clear_timeout(&self, key: &ResourceKey) {
        self.last_sent.lock().remove(key);
    }

    pub fn has_record(&self, key: &ResourceKey) -> bool {
        self.last_sent.lock().contains_key(key)
    }
}
