// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource identity and pod inspection helpers.

pub mod key;
pub mod pod;

pub use key::ResourceKey;
pub use pod::PodCrashExt;
