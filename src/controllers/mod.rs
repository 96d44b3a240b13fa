// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Controllers that run the watch-queue-reconcile loop.

pub mod pod;

pub use pod::{spawn_workers, PodController};
