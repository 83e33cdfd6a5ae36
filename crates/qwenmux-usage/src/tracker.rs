// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory token usage tracker.
//!
//! Totals live for the lifetime of the process and are never reset. Every
//! update is a single read-modify-write under one lock, so concurrent
//! requests finishing on the same model cannot lose increments.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use qwenmux_core::TokenUsage;
use serde::Serialize;
use tracing::debug;

/// Cumulative token counts for one model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelUsage {
    /// Total prompt tokens.
    pub input: u64,
    /// Total completion tokens.
    pub output: u64,
}

/// Immutable copy of the tracker's totals, ordered by model name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsageSnapshot(BTreeMap<String, ModelUsage>);

impl UsageSnapshot {
    /// Totals for one model, if it was ever recorded.
    pub fn get(&self, model: &str) -> Option<ModelUsage> {
        self.0.get(model).copied()
    }

    /// Sum of input tokens across all models.
    pub fn total_input(&self) -> u64 {
        self.0.values().map(|u| u.input).sum()
    }

    /// Sum of output tokens across all models.
    pub fn total_output(&self) -> u64 {
        self.0.values().map(|u| u.output).sum()
    }

    /// Sum of input and output tokens across all models.
    pub fn total(&self) -> u64 {
        self.total_input() + self.total_output()
    }

    /// Iterate `(model, usage)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ModelUsage)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of models with recorded usage.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Shared token usage tracker, keyed by model name.
#[derive(Debug, Default)]
pub struct TokenUsageTracker {
    usage: Mutex<HashMap<String, ModelUsage>>,
}

impl TokenUsageTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one call's token counts to the running totals for `model`.
    pub fn record(&self, model: &str, input_tokens: u64, output_tokens: u64) {
        let mut usage = self.lock();
        let entry = usage.entry(model.to_string()).or_default();
        entry.input += input_tokens;
        entry.output += output_tokens;
        debug!(
            model,
            input_tokens,
            output_tokens,
            total_input = entry.input,
            total_output = entry.output,
            "token usage recorded"
        );
    }

    /// Record a provider-reported usage; `None` counts as zero tokens.
    pub fn record_usage(&self, model: &str, usage: Option<TokenUsage>) {
        let usage = usage.unwrap_or_default();
        self.record(model, usage.input_tokens, usage.output_tokens);
    }

    /// Copy the current totals.
    pub fn snapshot(&self) -> UsageSnapshot {
        let usage = self.lock();
        UsageSnapshot(usage.iter().map(|(k, v)| (k.clone(), *v)).collect())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ModelUsage>> {
        // A panic while holding the lock cannot leave a half-applied update:
        // both counters are plain integer additions on an existing entry.
        self.usage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
