// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible HTTP gateway for qwenmux.
//!
//! Serves `POST /v1/chat/completions` on top of the analysis pipeline,
//! either as a single JSON response or as an emulated SSE stream, plus an
//! unauthenticated `GET /health`.

pub mod handlers;
pub mod server;
pub mod sse;
pub mod types;

pub use handlers::{ChatRequest, RequestError, extract_credential};
pub use server::{GatewayState, build_router, serve, start_server};
pub use sse::{StreamSettings, tokenize};
