// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end processing of a single question.
//!
//! Remote failures never escape [`AnalysisOrchestrator::process`]: they are
//! logged and turned into an answer text, so callers always get a result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use qwenmux_core::types::GenerationRequest;
use qwenmux_core::{Credential, GenerationProvider};
use qwenmux_router::{ModelSelector, SelectionResult};
use qwenmux_usage::{TokenUsageTracker, UsageSnapshot};
use tracing::{info, warn};

/// Answer used when the provider returns no text.
pub const EMPTY_ANSWER: &str = "[空响应]";

/// Prefix of the answer used when the answering call fails.
const ERROR_ANSWER_PREFIX: &str = "[错误] 模型调用失败: ";

/// Build the prompt sent to the answering model.
pub fn answer_prompt(question: &str) -> String {
    format!("用户提问：\n{question}\n请给出专业回答：")
}

/// Wall-clock time spent in each phase of [`AnalysisOrchestrator::process`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceBreakdown {
    pub model_selection: Duration,
    pub api_call: Duration,
    pub post_processing: Duration,
    pub total: Duration,
}

/// Outcome of processing one question.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Trimmed answer, or a bracketed placeholder on empty output or failure.
    pub final_answer: String,
    /// Tracker totals taken after this question's usage was recorded.
    pub token_usage: UsageSnapshot,
    /// Model that answered the question.
    pub selected_model: String,
    /// Full selection outcome, including the path that produced the model.
    pub selection: SelectionResult,
    /// Per-phase timings.
    pub performance: PerformanceBreakdown,
}

/// Runs questions through selection and generation.
pub struct AnalysisOrchestrator {
    selector: Arc<ModelSelector>,
    provider: Arc<dyn GenerationProvider>,
    tracker: Arc<TokenUsageTracker>,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator. `tracker` should be the one the selector
    /// records evaluation usage into, so snapshots cover both calls.
    pub fn new(
        selector: Arc<ModelSelector>,
        provider: Arc<dyn GenerationProvider>,
        tracker: Arc<TokenUsageTracker>,
    ) -> Self {
        Self {
            selector,
            provider,
            tracker,
        }
    }

    /// The shared usage tracker.
    pub fn tracker(&self) -> &Arc<TokenUsageTracker> {
        &self.tracker
    }

    /// Process one question. Never fails.
    pub async fn process(&self, question: &str, credential: Option<&Credential>) -> AnalysisResult {
        let started = Instant::now();

        let selection = self.selector.select(question, credential).await;
        let model_selection = started.elapsed();

        let call_started = Instant::now();
        let outcome = self
            .provider
            .generate(GenerationRequest {
                model: selection.model.clone(),
                prompt: answer_prompt(question),
                credential: credential.cloned(),
            })
            .await;
        let api_call = call_started.elapsed();

        let post_started = Instant::now();
        let final_answer = match outcome {
            Ok(response) => {
                self.tracker.record_usage(&selection.model, response.usage);
                match response.text {
                    Some(text) => text.trim().to_string(),
                    None => EMPTY_ANSWER.to_string(),
                }
            }
            Err(e) => {
                warn!(model = %selection.model, error = %e, "answer generation failed");
                format!("{ERROR_ANSWER_PREFIX}{e}")
            }
        };
        let token_usage = self.tracker.snapshot();
        let post_processing = post_started.elapsed();

        let performance = PerformanceBreakdown {
            model_selection,
            api_call,
            post_processing,
            total: started.elapsed(),
        };

        info!(
            model = %selection.model,
            selection_ms = performance.model_selection.as_millis() as u64,
            api_call_ms = performance.api_call.as_millis() as u64,
            post_processing_ms = performance.post_processing.as_millis() as u64,
            total_ms = performance.total.as_millis() as u64,
            "question processed"
        );

        AnalysisResult {
            final_answer,
            token_usage,
            selected_model: selection.model.clone(),
            selection,
            performance,
        }
    }
}

impl std::fmt::Debug for AnalysisOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisOrchestrator")
            .field("selector", &self.selector)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
