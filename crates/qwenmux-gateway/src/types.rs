// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible wire types for `/v1/chat/completions`.

use serde::{Deserialize, Serialize};

/// Object tag of a single-shot response.
pub const COMPLETION_OBJECT: &str = "chat.completion";

/// Object tag of a streamed chunk.
pub const CHUNK_OBJECT: &str = "chat.completion.chunk";

/// Role stamped on every assistant message and delta.
pub const ASSISTANT_ROLE: &str = "assistant";

/// Finish reason of a completed answer.
pub const FINISH_STOP: &str = "stop";

/// Generate a completion id shared by every chunk of one response.
pub fn completion_id() -> String {
    format!("chatcmpl-{}", uuid::Uuid::new_v4().simple())
}

/// Token accounting reported to the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A chat message in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

/// One choice of a single-shot response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

/// Response body when `stream` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatCompletion {
    /// Build a one-choice response carrying the whole answer.
    pub fn new(id: String, model: String, answer: String, usage: Usage) -> Self {
        Self {
            id,
            object: COMPLETION_OBJECT.to_string(),
            created: chrono::Utc::now().timestamp(),
            model,
            choices: vec![Choice {
                index: 0,
                message: AssistantMessage {
                    role: ASSISTANT_ROLE.to_string(),
                    content: answer,
                },
                finish_reason: FINISH_STOP.to_string(),
            }],
            usage,
        }
    }
}

/// Incremental content of a streamed chunk. Empty on the terminal chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// One choice of a streamed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: Delta,
    /// `null` on content chunks, `"stop"` on the terminal chunk.
    pub finish_reason: Option<String>,
}

/// One `data:` event of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatCompletionChunk {
    /// A content chunk carrying one token.
    pub fn token(id: &str, model: &str, content: String) -> Self {
        Self::build(
            id,
            model,
            Delta {
                role: Some(ASSISTANT_ROLE.to_string()),
                content: Some(content),
            },
            None,
            None,
        )
    }

    /// The terminal chunk: empty delta, `finish_reason: "stop"`, usage.
    pub fn terminal(id: &str, model: &str, usage: Usage) -> Self {
        Self::build(
            id,
            model,
            Delta::default(),
            Some(FINISH_STOP.to_string()),
            Some(usage),
        )
    }

    fn build(
        id: &str,
        model: &str,
        delta: Delta,
        finish_reason: Option<String>,
        usage: Option<Usage>,
    ) -> Self {
        Self {
            id: id.to_string(),
            object: CHUNK_OBJECT.to_string(),
            created: chrono::Utc::now().timestamp(),
            model: model.to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            }],
            usage,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}
