// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys read from watched pods
pub mod annotations {
    /// Set to [`INFORM`] to enable crash loop alerts for a pod
    pub const ENABLED: &str = "espe.tech/mattermost";
    /// Value of [`ENABLED`] that opts a pod in
    pub const INFORM: &str = "inform";
    /// Per-pod debounce window override, in seconds
    pub const BACKOFF: &str = "espe.tech/mattermost-backoff";
}

/// Waiting reason the kubelet reports for a container in a crash-restart loop
pub const CRASH_LOOP_REASON: &str = "CrashLoopBackOff";

/// Debounce window applied when a pod does not override it (10 minutes)
pub const DEFAULT_NOTIFY_WINDOW_SECS: u64 = 600;

/// Number of rate limited retries before a key is dropped out of the queue
pub const MAX_RETRIES: u32 = 5;

/// Rate limiter configuration for requeued keys
pub mod rate_limit {
    /// Per-item exponential backoff base delay in milliseconds
    pub const BASE_DELAY_MILLIS: u64 = 5;
    /// Per-item exponential backoff ceiling in seconds
    pub const MAX_DELAY_SECS: u64 = 1000;
    /// Overall bucket refill rate, tokens per second
    pub const BUCKET_QPS: f64 = 10.0;
    /// Overall bucket size
    pub const BUCKET_BURST: u32 = 100;
}

/// Capacity of the channel between the watch subscription and the event bridge
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Crash alert presentation
pub mod alert {
    pub const TITLE: &str = "Crash loop detected!";
    pub const COLOR: &str = "#AD2200";
    /// Number of log lines attached to an alert
    pub const LOG_TAIL_LINES: i64 = 50;
}
