// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API helpers used outside the watch.

pub mod logs;

pub use logs::PodLogs;
