// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Work queue and retry rate limiting.

pub mod rate_limiter;
pub mod work_queue;

pub use rate_limiter::{default_controller_rate_limiter, RateLimiter};
pub use work_queue::WorkQueue;
