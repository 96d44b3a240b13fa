// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of queued pod keys into crash loop alerts.

pub mod debounce;
pub mod pod;

pub use debounce::NotificationDebouncer;
pub use pod::PodReconciler;
