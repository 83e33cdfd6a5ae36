// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic question complexity classification.
//!
//! A question is complex when it mentions any configured keyword or is
//! longer than the length threshold. No network, no model call.

use qwenmux_config::model::RoutingConfig;

/// Complexity tiers driving model selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionTier {
    /// Answered by the default model without an evaluation call.
    Simple,
    /// Routed through an evaluation model.
    Complex,
}

impl std::fmt::Display for QuestionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionTier::Simple => write!(f, "simple"),
            QuestionTier::Complex => write!(f, "complex"),
        }
    }
}

/// Result of classifying a question.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The classified tier.
    pub tier: QuestionTier,
    /// Human-readable reason for the classification.
    pub reason: &'static str,
}

/// Keyword and length based classifier.
#[derive(Debug, Clone)]
pub struct QuestionClassifier {
    keywords: Vec<String>,
    length_threshold: usize,
}

impl QuestionClassifier {
    /// Create a classifier from explicit keywords and a character threshold.
    pub fn new(keywords: Vec<String>, length_threshold: usize) -> Self {
        Self {
            keywords,
            length_threshold,
        }
    }

    /// Create a classifier from the `[routing]` config section.
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.complex_keywords.clone(), config.length_threshold)
    }

    /// Classify a question.
    ///
    /// Length is counted in characters, not bytes, so CJK text is measured
    /// the way a reader would count it.
    pub fn classify(&self, question: &str) -> Classification {
        if self.keywords.iter().any(|k| question.contains(k.as_str())) {
            return Classification {
                tier: QuestionTier::Complex,
                reason: "complex keyword",
            };
        }

        if question.chars().count() > self.length_threshold {
            return Classification {
                tier: QuestionTier::Complex,
                reason: "exceeds length threshold",
            };
        }

        Classification {
            tier: QuestionTier::Simple,
            reason: "short question without complex keywords",
        }
    }
}

impl Default for QuestionClassifier {
    fn default() -> Self {
        Self::from_config(&RoutingConfig::default())
    }
}
