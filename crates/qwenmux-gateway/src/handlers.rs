// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles POST /v1/chat/completions and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response, sse::Sse},
};
use futures::StreamExt;
use qwenmux_core::Credential;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::server::GatewayState;
use crate::sse::{self, StreamEvent, StreamedCompletion};
use crate::types::{ChatCompletion, ErrorResponse, HealthResponse, Usage, completion_id};

/// Header carrying the caller's DashScope key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Characters of the question and answer included in logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Rejection reasons for a chat completion body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid JSON format")]
    InvalidJson,
    #[error("Missing messages")]
    MissingMessages,
    #[error("Missing required key: {0}")]
    MissingKey(&'static str),
}

/// The parts of a chat completion body the gateway acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Content of the last message.
    pub question: String,
    /// Whether to stream the answer. Defaults to true.
    pub stream: bool,
    /// Model named by the client. Informational only.
    pub requested_model: Option<String>,
}

impl ChatRequest {
    /// Parse a raw request body.
    ///
    /// Only the last message is used, and only its `content`; `role` and
    /// earlier turns are ignored.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;

        let last = value
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
            .ok_or(RequestError::MissingMessages)?;

        let question = last
            .get("content")
            .and_then(Value::as_str)
            .ok_or(RequestError::MissingKey("content"))?;

        Ok(Self {
            question: question.to_string(),
            stream: value.get("stream").and_then(Value::as_bool).unwrap_or(true),
            requested_model: value
                .get("model")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Read the caller's key from `x-api-key`, falling back to a bearer token.
pub fn extract_credential(headers: &HeaderMap) -> Option<Credential> {
    let from_header = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let key = from_header.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|k| !k.is_empty())
    })?;

    Some(Credential::new(key))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

/// POST /v1/chat/completions
///
/// Runs the question through the orchestrator and returns either a single
/// `chat.completion` object or an SSE stream of chunks. Upstream failures
/// surface as answer text with status 200.
pub async fn chat_completions(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(credential) = extract_credential(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing API key in header");
    };

    let request = match ChatRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "rejecting chat completion request");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    info!(
        question = %preview(&request.question),
        stream = request.stream,
        requested_model = request.requested_model.as_deref().unwrap_or("-"),
        "chat completion requested"
    );

    let orchestrator = state.orchestrator.clone();
    let question = request.question;
    let task = tokio::spawn(async move { orchestrator.process(&question, Some(&credential)).await });
    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "analysis task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    debug!(answer = %preview(&result.final_answer), model = %result.selected_model, "answer ready");

    let id = completion_id();
    if !request.stream {
        let usage = Usage::new(
            result.token_usage.total_input(),
            result.token_usage.total_output(),
        );
        let completion = ChatCompletion::new(id, result.selected_model, result.final_answer, usage);
        return Json(completion).into_response();
    }

    let completion = StreamedCompletion {
        id,
        model: result.selected_model,
        answer: result.final_answer,
        prompt_tokens: result.token_usage.total_input(),
    };
    let events = sse::emulate(completion, state.streaming).map(StreamEvent::into_sse);

    (
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(events),
    )
        .into_response()
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
