// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the DashScope REST API.
//!
//! Provides [`DashScopeClient`] which handles request construction,
//! per-request credentials, timeouts, and transient error retry.

use std::time::Duration;

use qwenmux_config::model::DashscopeConfig;
use qwenmux_core::{Credential, QwenmuxError};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorBody, GenerationBody, GenerationReply, ModelListReply};

/// Path of the text-generation endpoint, relative to the base URL.
const GENERATION_PATH: &str = "/services/aigc/text-generation/generation";

/// Path of the model listing endpoint, relative to the base URL.
const MODELS_PATH: &str = "/models";

/// HTTP client for DashScope.
///
/// The credential is supplied per call because every inbound request carries
/// its own key.
#[derive(Debug, Clone)]
pub struct DashScopeClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
}

impl DashScopeClient {
    /// Creates a client from the `[dashscope]` config section.
    pub fn new(config: &DashscopeConfig) -> Result<Self, QwenmuxError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| QwenmuxError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: config.max_retries,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a text generation call.
    pub async fn generate(
        &self,
        body: &GenerationBody,
        credential: Option<&Credential>,
    ) -> Result<GenerationReply, QwenmuxError> {
        let url = format!("{}{GENERATION_PATH}", self.base_url);
        let response = self
            .send_with_retry("generation", || {
                let req = self.client.post(&url).json(body);
                match credential {
                    Some(c) => req.bearer_auth(c.expose()),
                    None => req,
                }
            })
            .await?;

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&text).map_err(|e| QwenmuxError::Provider {
            message: format!("failed to parse generation response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Fetches one page of the model listing. Non-success statuses are errors.
    pub async fn list_models(
        &self,
        page: u32,
        page_size: u32,
        credential: &Credential,
    ) -> Result<ModelListReply, QwenmuxError> {
        let url = format!(
            "{}{MODELS_PATH}?page_no={page}&page_size={page_size}",
            self.base_url
        );
        let response = self
            .send_with_retry("model listing", || {
                self.client.get(&url).bearer_auth(credential.expose())
            })
            .await?;

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&text).map_err(|e| QwenmuxError::Provider {
            message: format!("failed to parse model listing: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a request, retrying transient failures after a one second pause.
    ///
    /// Only successful responses are returned; everything else becomes a
    /// provider error carrying DashScope's `code` and `message` when present.
    async fn send_with_retry<F>(
        &self,
        what: &'static str,
        build: F,
    ) -> Result<reqwest::Response, QwenmuxError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, what, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = build().send().await.map_err(|e| self.transport_error(e))?;
            let status = response.status();
            debug!(status = %status, attempt, what, "response received");

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            let error = QwenmuxError::Provider {
                message: describe_error(status, &body),
                source: None,
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, what, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| QwenmuxError::Provider {
            message: format!("{what} request failed after retries"),
            source: None,
        }))
    }

    fn transport_error(&self, e: reqwest::Error) -> QwenmuxError {
        if e.is_timeout() {
            QwenmuxError::Timeout {
                duration: self.timeout,
            }
        } else {
            QwenmuxError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api_err) => format!("DashScope API error ({}): {}", api_err.code, api_err.message),
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
