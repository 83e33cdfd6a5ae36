// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token usage accounting for qwenmux.
//!
//! - **Tracker**: shared, lock-protected running totals per model name
//! - **Snapshot**: immutable copy of the totals handed to response builders

pub mod tracker;

pub use tracker::{ModelUsage, TokenUsageTracker, UsageSnapshot};
