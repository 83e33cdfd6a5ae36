// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question classification and model selection for qwenmux.
//!
//! This crate provides:
//! - [`QuestionClassifier`]: keyword/length heuristic (zero-cost, zero-latency)
//! - [`Catalog`] and [`CatalogStore`]: the merged local + remote model catalog
//! - [`PromptTemplate`]: the evaluation prompt loaded at startup
//! - [`ModelSelector`]: picks the model that should answer a question,
//!   optionally asking a cheap "turbo" evaluation model for a recommendation

pub mod catalog;
pub mod classifier;
pub mod prompt;
pub mod selector;

pub use catalog::{Catalog, CatalogStore, CostCategory, ModelDescriptor};
pub use classifier::{Classification, QuestionClassifier, QuestionTier};
pub use prompt::PromptTemplate;
pub use selector::{ModelSelector, SelectionPath, SelectionResult};
