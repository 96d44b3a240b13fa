// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod watch subscription, local cache and the bridge into the work queue.

pub mod bridge;
pub mod events;
pub mod subscription;

pub use bridge::{EventBridge, EventBridgeHandle};
pub use events::{DeletedPod, EventClassifier, PodEvent};
pub use subscription::{wait_for_initial_sync, PodCache, Subscription};
