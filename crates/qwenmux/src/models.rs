// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `qwenmux models` - list the models the remote API reports.

use qwenmux_config::QwenmuxConfig;
use qwenmux_core::types::ModelListRequest;
use qwenmux_core::{GenerationProvider, QwenmuxError};
use qwenmux_dashscope::DashScopeProvider;
use qwenmux_router::ModelDescriptor;
use tracing::info;

use crate::app::{API_KEY_ENV, resolve_api_key};

/// Fetch the first listing page and print it.
///
/// With `json`, prints catalog-compatible descriptors that can be saved as
/// the local catalog file.
pub async fn run_models(
    config: QwenmuxConfig,
    api_key: Option<String>,
    json: bool,
) -> Result<(), QwenmuxError> {
    let credential = resolve_api_key(api_key, &config).ok_or_else(|| {
        QwenmuxError::Config(format!("an API key is required (--api-key or {API_KEY_ENV})"))
    })?;

    let provider = DashScopeProvider::new(&config.dashscope)?;
    let listing = provider
        .list_models(ModelListRequest {
            page: 1,
            page_size: config.catalog.remote_page_size,
            credential,
        })
        .await?;
    info!(
        total = listing.total,
        fetched = listing.models.len(),
        "remote models fetched"
    );

    let descriptors: Vec<ModelDescriptor> = listing
        .models
        .into_iter()
        .map(ModelDescriptor::from_remote)
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&descriptors)
            .map_err(|e| QwenmuxError::Internal(format!("failed to encode models: {e}")))?;
        println!("{out}");
    } else {
        for d in &descriptors {
            println!("- {}: {}", d.name, d.description);
        }
    }
    Ok(())
}
