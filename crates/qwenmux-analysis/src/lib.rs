// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question analysis pipeline for qwenmux.
//!
//! [`AnalysisOrchestrator`] runs one question end to end: model selection,
//! the answering call, usage accounting, and answer post-processing.

pub mod orchestrator;

pub use orchestrator::{
    AnalysisOrchestrator, AnalysisResult, EMPTY_ANSWER, PerformanceBreakdown, answer_prompt,
};
