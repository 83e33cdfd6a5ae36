// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation provider for deterministic testing.
//!
//! `MockProvider` implements `GenerationProvider` with pre-configured
//! responses and a scripted model listing, and records every call.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use qwenmux_core::types::{
    GenerationRequest, GenerationResponse, ModelListRequest, ModelListing, RemoteModel,
    TokenUsage,
};
use qwenmux_core::{GenerationProvider, QwenmuxError};

/// Usage reported for default and text-only responses.
pub const MOCK_USAGE: TokenUsage = TokenUsage {
    input_tokens: 10,
    output_tokens: 20,
};

type Scripted = Result<GenerationResponse, String>;

/// A mock provider that returns pre-configured responses.
///
/// Generation results are popped from a FIFO queue. When the queue is empty,
/// a "mock response" text with [`MOCK_USAGE`] is returned. The model listing
/// is fixed until replaced and defaults to an empty listing.
pub struct MockProvider {
    responses: Mutex<VecDeque<Scripted>>,
    listing: Mutex<Result<ModelListing, String>>,
    requests: Mutex<Vec<GenerationRequest>>,
    list_calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            listing: Mutex::new(Ok(ModelListing {
                models: Vec::new(),
                total: 0,
            })),
            requests: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Queue a text response carrying [`MOCK_USAGE`].
    pub fn push_text(&self, text: impl Into<String>) {
        self.push_response(GenerationResponse {
            request_id: Some(format!("mock-{}", uuid::Uuid::new_v4())),
            text: Some(text.into()),
            usage: Some(MOCK_USAGE),
        });
    }

    /// Queue a fully specified response.
    pub fn push_response(&self, response: GenerationResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queue a provider error.
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.responses).push_back(Err(message.into()));
    }

    /// Replace the model listing.
    pub fn set_listing(&self, models: Vec<RemoteModel>) {
        let total = models.len() as u64;
        *lock(&self.listing) = Ok(ModelListing {
            models,
            total,
        });
    }

    /// Make every subsequent listing call fail.
    pub fn set_listing_error(&self, message: impl Into<String>) {
        *lock(&self.listing) = Err(message.into());
    }

    /// Every generation request received, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// Number of generation calls received.
    pub fn generate_calls(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of listing calls received.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn provider_error(message: String) -> QwenmuxError {
    QwenmuxError::Provider {
        message,
        source: None,
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, QwenmuxError> {
        lock(&self.requests).push(request);
        let next = lock(&self.responses).pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(provider_error(message)),
            None => Ok(GenerationResponse {
                request_id: None,
                text: Some("mock response".to_string()),
                usage: Some(MOCK_USAGE),
            }),
        }
    }

    async fn list_models(&self, _request: ModelListRequest) -> Result<ModelListing, QwenmuxError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.listing).clone().map_err(provider_error)
    }
}
