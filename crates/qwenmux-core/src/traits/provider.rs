// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider trait for the remote model API (DashScope or a test double).

use async_trait::async_trait;

use crate::error::QwenmuxError;
use crate::types::{GenerationRequest, GenerationResponse, ModelListRequest, ModelListing};

/// Outbound access to a hosted model provider.
///
/// The router uses it for evaluation calls and catalog refreshes, the
/// orchestrator for the answering call. Implementations must be cheap to
/// share behind an `Arc`.
#[async_trait]
pub trait GenerationProvider: Send + Sync + 'static {
    /// Returns the human-readable name of this provider.
    fn name(&self) -> &str;

    /// Runs a single text generation call and returns the full response.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, QwenmuxError>;

    /// Fetches one page of the provider's model listing.
    async fn list_models(&self, request: ModelListRequest) -> Result<ModelListing, QwenmuxError>;
}
