// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DashScope provider adapter for qwenmux.
//!
//! Implements [`GenerationProvider`] on top of the DashScope REST API:
//! prompt-style text generation and the paged model listing.

pub mod client;
pub mod types;

use async_trait::async_trait;
use qwenmux_config::model::DashscopeConfig;
use qwenmux_core::types::{
    GenerationRequest, GenerationResponse, ModelListRequest, ModelListing, RemoteModel,
    TokenUsage,
};
use qwenmux_core::{GenerationProvider, QwenmuxError};
use tracing::{debug, warn};

pub use client::DashScopeClient;

use crate::types::GenerationBody;

/// DashScope implementation of [`GenerationProvider`].
#[derive(Debug, Clone)]
pub struct DashScopeProvider {
    client: DashScopeClient,
}

impl DashScopeProvider {
    /// Creates a provider from the `[dashscope]` config section.
    pub fn new(config: &DashscopeConfig) -> Result<Self, QwenmuxError> {
        Ok(Self {
            client: DashScopeClient::new(config)?,
        })
    }
}

#[async_trait]
impl GenerationProvider for DashScopeProvider {
    fn name(&self) -> &str {
        "dashscope"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, QwenmuxError> {
        let body = GenerationBody::text(&request.model, &request.prompt);
        let reply = self
            .client
            .generate(&body, request.credential.as_ref())
            .await?;

        debug!(
            model = %request.model,
            request_id = reply.request_id.as_deref().unwrap_or("-"),
            finish_reason = reply
                .output
                .as_ref()
                .and_then(|o| o.finish_reason.as_deref())
                .unwrap_or("-"),
            "generation completed"
        );

        Ok(GenerationResponse {
            request_id: reply.request_id,
            text: reply.output.and_then(|o| o.text),
            usage: reply.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    async fn list_models(&self, request: ModelListRequest) -> Result<ModelListing, QwenmuxError> {
        let reply = self
            .client
            .list_models(request.page, request.page_size, &request.credential)
            .await?;

        let output = reply.output.ok_or_else(|| QwenmuxError::Provider {
            message: "model listing response has no output".to_string(),
            source: None,
        })?;

        let models = output
            .models
            .into_iter()
            .filter_map(|entry| match entry.get("name").and_then(|n| n.as_str()) {
                Some(name) => Some(RemoteModel {
                    name: name.to_string(),
                    description: entry
                        .get("description")
                        .and_then(|d| d.as_str())
                        .unwrap_or_default()
                        .to_string(),
                }),
                None => {
                    warn!(entry = %entry, "skipping malformed remote model entry");
                    None
                }
            })
            .collect();

        Ok(ModelListing {
            models,
            total: output.total,
        })
    }
}
