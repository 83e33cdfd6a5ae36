// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pipeline wiring shared by `serve` and `ask`.

use std::sync::Arc;

use qwenmux_analysis::AnalysisOrchestrator;
use qwenmux_config::QwenmuxConfig;
use qwenmux_core::{Credential, GenerationProvider, QwenmuxError};
use qwenmux_dashscope::DashScopeProvider;
use qwenmux_router::{CatalogStore, ModelSelector};
use qwenmux_usage::TokenUsageTracker;
use tracing::info;

/// Environment variable consulted when no `--api-key` is given.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Build the provider, catalog, selector, and orchestrator from config.
///
/// Fails if the HTTP client cannot be built or the prompt template is missing.
pub fn build_orchestrator(config: &QwenmuxConfig) -> Result<Arc<AnalysisOrchestrator>, QwenmuxError> {
    let dyn_provider: Arc<dyn GenerationProvider> =
        Arc::new(DashScopeProvider::new(&config.dashscope)?);

    let catalog = Arc::new(CatalogStore::from_config(&config.catalog, dyn_provider.clone()));
    let tracker = Arc::new(TokenUsageTracker::new());
    let selector = ModelSelector::from_config(
        &config.routing,
        catalog.clone(),
        dyn_provider.clone(),
        tracker.clone(),
    )?;

    info!(
        default_model = %config.routing.default_model,
        catalog_models = catalog.local().len(),
        evaluators = catalog.local().evaluation_candidates().len(),
        "model selector ready"
    );

    let orchestrator = AnalysisOrchestrator::new(Arc::new(selector), dyn_provider, tracker);
    Ok(Arc::new(orchestrator))
}

/// Resolve the key for CLI commands: flag, then environment, then config.
pub fn resolve_api_key(flag: Option<String>, config: &QwenmuxConfig) -> Option<Credential> {
    flag.or_else(|| std::env::var(API_KEY_ENV).ok())
        .or_else(|| config.dashscope.api_key.clone())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(Credential::new)
}
