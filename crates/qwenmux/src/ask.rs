// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `qwenmux ask` - answer one question locally, without the HTTP layer.

use std::time::Duration;

use qwenmux_analysis::AnalysisResult;
use qwenmux_config::QwenmuxConfig;
use qwenmux_core::QwenmuxError;
use tracing::warn;

use crate::app::{API_KEY_ENV, build_orchestrator, resolve_api_key};

/// Run the full pipeline for `question` and print the result to stdout.
pub async fn run_ask(
    config: QwenmuxConfig,
    question: &str,
    api_key: Option<String>,
) -> Result<(), QwenmuxError> {
    let credential = resolve_api_key(api_key, &config);
    if credential.is_none() {
        warn!("no API key given (--api-key or {API_KEY_ENV}), remote calls will be rejected");
    }

    let orchestrator = build_orchestrator(&config)?;
    let result = orchestrator.process(question, credential.as_ref()).await;

    print!("{}", render(question, &result)?);
    Ok(())
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn render(question: &str, result: &AnalysisResult) -> Result<String, QwenmuxError> {
    let usage = serde_json::to_string(&result.token_usage)
        .map_err(|e| QwenmuxError::Internal(format!("failed to encode token usage: {e}")))?;
    let perf = &result.performance;

    Ok(format!(
        "Question: {question}\n\n\
         Answer:\n{answer}\n\n\
         Token usage: {usage}\n\
         Selected model: {model} ({path:?})\n\
         Timings: selection {sel:.2} ms, api call {api:.2} ms, post-processing {post:.2} ms, total {total:.2} ms\n",
        answer = result.final_answer,
        model = result.selected_model,
        path = result.selection.path,
        sel = millis(perf.model_selection),
        api = millis(perf.api_call),
        post = millis(perf.post_processing),
        total = millis(perf.total),
    ))
}
