// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across qwenmux crates.

use serde::{Deserialize, Serialize};

/// Per-request API key used to authenticate against the remote provider.
///
/// The key is passed through unmodified and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw API key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for use in an outbound request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([redacted])")
    }
}

/// Token counts reported by the provider for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub input_tokens: u64,
    /// Tokens produced by the model.
    pub output_tokens: u64,
}

/// A single-shot generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Remote model name.
    pub model: String,
    /// Full prompt text.
    pub prompt: String,
    /// Caller's credential, forwarded as-is.
    pub credential: Option<Credential>,
}

/// The result of a generation call.
///
/// Both fields are optional because the provider may omit them; callers
/// substitute their own defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// Provider-side request identifier, when reported.
    pub request_id: Option<String>,
    /// Generated text.
    pub text: Option<String>,
    /// Token usage for this call.
    pub usage: Option<TokenUsage>,
}

/// One page of the provider's model listing.
#[derive(Debug, Clone)]
pub struct ModelListRequest {
    /// 1-based page number.
    pub page: u32,
    /// Entries per page.
    pub page_size: u32,
    /// Credential for the listing call.
    pub credential: Credential,
}

/// A model entry as returned by the provider's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModel {
    /// Model name.
    pub name: String,
    /// Free-form description (empty when absent).
    pub description: String,
}

/// One successful page of a model listing.
///
/// Providers report non-success responses as errors, never as a listing.
#[derive(Debug, Clone)]
pub struct ModelListing {
    /// Models on this page.
    pub models: Vec<RemoteModel>,
    /// Total models reported by the provider.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("sk-secret");
        let debug = format!("{cred:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(cred.expose(), "sk-secret");
    }

    #[test]
    fn token_usage_default_is_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.input_tokens, 0);
        assert_eq!(usage.output_tokens, 0);
    }
}
