// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use qwenmux_analysis::AnalysisOrchestrator;
use qwenmux_config::model::ServerConfig;
use qwenmux_core::QwenmuxError;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse::StreamSettings;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Pipeline answering each question.
    pub orchestrator: Arc<AnalysisOrchestrator>,
    /// Streaming emulation settings.
    pub streaming: StreamSettings,
    /// Process start time for uptime calculation.
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>, streaming: StreamSettings) -> Self {
        Self {
            orchestrator,
            streaming,
            started_at: Instant::now(),
        }
    }
}

/// Build the gateway router.
///
/// Routes:
/// - POST /v1/chat/completions (caller supplies its DashScope key)
/// - GET /health (unauthenticated)
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to the configured host:port and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), QwenmuxError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| QwenmuxError::Gateway {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");
    serve(listener, state, shutdown).await
}

/// Serve on an already bound listener until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish.
pub async fn serve(
    listener: TcpListener,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), QwenmuxError> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| QwenmuxError::Gateway {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use qwenmux_config::model::RoutingConfig;
    use qwenmux_core::types::{GenerationResponse, TokenUsage};
    use qwenmux_router::{
        Catalog, CatalogStore, CostCategory, ModelDescriptor, ModelSelector, PromptTemplate,
    };
    use qwenmux_test_utils::MockProvider;
    use qwenmux_usage::TokenUsageTracker;
    use tower::ServiceExt;

    use super::*;
    use crate::types::{ChatCompletion, ChatCompletionChunk, HealthResponse};

    fn test_state(provider: Arc<MockProvider>, done_sentinel: bool) -> GatewayState {
        let tracker = Arc::new(TokenUsageTracker::new());
        let catalog = Catalog::from_entries(["qwen-turbo", "qwen-turbo-latest"].map(|name| {
            ModelDescriptor {
                name: name.to_string(),
                description: String::new(),
                capabilities: BTreeSet::new(),
                cost_category: CostCategory::Free,
                free_tier_eligible: name.ends_with("latest"),
            }
        }));
        let selector = ModelSelector::new(
            &RoutingConfig::default(),
            PromptTemplate::new("{question}"),
            Arc::new(CatalogStore::new(catalog, provider.clone())),
            provider.clone(),
            tracker.clone(),
        );
        let orchestrator = AnalysisOrchestrator::new(Arc::new(selector), provider, tracker);
        GatewayState::new(
            Arc::new(orchestrator),
            StreamSettings {
                chunk_delay: Duration::ZERO,
                done_sentinel,
            },
        )
    }

    fn chat_request(body: &str, api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header("content-type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn data_lines(body: &str) -> Vec<&str> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .collect()
    }

    #[tokio::test]
    async fn missing_api_key_is_401() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), true));
        let response = app
            .oneshot(chat_request(r#"{"messages":[{"content":"hi"}]}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Missing API key in header"}"#
        );
    }

    #[tokio::test]
    async fn invalid_json_is_400() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), true));
        let response = app.oneshot(chat_request("{oops", Some("k"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Invalid JSON format"));
    }

    #[tokio::test]
    async fn empty_messages_is_400() {
        let provider = Arc::new(MockProvider::new());
        let app = build_router(test_state(provider.clone(), true));
        let response = app
            .oneshot(chat_request(r#"{"messages":[]}"#, Some("k")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Missing messages"));
        assert_eq!(provider.generate_calls(), 0);
    }

    #[tokio::test]
    async fn missing_content_is_400() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), true));
        let response = app
            .oneshot(chat_request(r#"{"messages":[{"role":"user"}]}"#, Some("k")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            body_string(response)
                .await
                .contains("Missing required key: content")
        );
    }

    #[tokio::test]
    async fn non_streaming_simple_question() {
        let provider = Arc::new(MockProvider::new());
        provider.push_response(GenerationResponse {
            request_id: None,
            text: Some("1+1等于2。".into()),
            usage: Some(TokenUsage {
                input_tokens: 15,
                output_tokens: 6,
            }),
        });
        let app = build_router(test_state(provider.clone(), true));

        let response = app
            .oneshot(chat_request(
                r#"{"stream":false,"messages":[{"role":"user","content":"1+1等于几？"}]}"#,
                Some("sk-test"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let completion: ChatCompletion =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(completion.object, "chat.completion");
        assert_eq!(completion.model, "qwen-turbo-latest");
        assert_eq!(completion.choices[0].message.content, "1+1等于2。");
        assert_eq!(completion.usage.prompt_tokens, 15);
        assert_eq!(completion.usage.completion_tokens, 6);
        assert_eq!(completion.usage.total_tokens, 21);
        assert_eq!(provider.generate_calls(), 1);
        assert_eq!(
            provider.requests()[0].credential.as_ref().map(|c| c.expose()),
            Some("sk-test")
        );
    }

    #[tokio::test]
    async fn streaming_response_replays_answer() {
        let provider = Arc::new(MockProvider::new());
        provider.push_response(GenerationResponse {
            request_id: None,
            text: Some("答案是 2。".into()),
            usage: Some(TokenUsage {
                input_tokens: 9,
                output_tokens: 3,
            }),
        });
        let app = build_router(test_state(provider, true));

        let response = app
            .oneshot(chat_request(r#"{"messages":[{"content":"1+1？"}]}"#, Some("k")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(
            headers["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
        assert_eq!(headers["cache-control"], "no-cache");
        assert_eq!(headers["x-accel-buffering"], "no");

        let body = body_string(response).await;
        let lines = data_lines(&body);
        assert_eq!(lines.last(), Some(&"[DONE]"));

        let chunks: Vec<ChatCompletionChunk> = lines[..lines.len() - 1]
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let (terminal, content) = chunks.split_last().unwrap();

        let text: String = content
            .iter()
            .map(|c| c.choices[0].delta.content.clone().unwrap())
            .collect();
        assert_eq!(text, "答案是 2。");
        assert!(content.iter().all(|c| c.id == terminal.id));

        let usage = terminal.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 9);
        assert_eq!(usage.completion_tokens, content.len() as u64);
        assert_eq!(usage.total_tokens, 9 + content.len() as u64);
    }

    #[tokio::test]
    async fn streaming_without_sentinel() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), false));
        let response = app
            .oneshot(chat_request(r#"{"messages":[{"content":"hi"}]}"#, Some("k")))
            .await
            .unwrap();
        let body = body_string(response).await;
        assert!(!body.contains("[DONE]"));
        assert!(body.contains(r#""finish_reason":"stop""#));
    }

    #[tokio::test]
    async fn upstream_error_is_reported_as_answer() {
        let provider = Arc::new(MockProvider::new());
        provider.push_error("InvalidApiKey");
        let app = build_router(test_state(provider, true));

        let response = app
            .oneshot(chat_request(
                r#"{"stream":false,"messages":[{"content":"hi"}]}"#,
                Some("bad"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let completion: ChatCompletion =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert!(
            completion.choices[0]
                .message
                .content
                .starts_with("[错误] 模型调用失败: ")
        );
    }

    #[tokio::test]
    async fn bearer_header_is_accepted() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), true));
        let request = Request::builder()
            .method("POST")
            .uri("/v1/chat/completions")
            .header("authorization", "Bearer sk-compat")
            .body(Body::from(r#"{"stream":false,"messages":[{"content":"hi"}]}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_unauthenticated() {
        let app = build_router(test_state(Arc::new(MockProvider::new()), true));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn serve_stops_on_cancellation() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(
            listener,
            test_state(Arc::new(MockProvider::new()), true),
            shutdown.clone(),
        ));
        shutdown.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
