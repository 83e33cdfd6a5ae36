// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the DashScope REST API.

use serde::{Deserialize, Serialize};

/// Body of a text-generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationBody {
    pub model: String,
    pub input: GenerationInput,
    pub parameters: GenerationParameters,
}

/// Prompt-style input (as opposed to the `messages` form).
#[derive(Debug, Clone, Serialize)]
pub struct GenerationInput {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationParameters {
    /// `"text"` returns `output.text`; `"message"` would return `output.choices`.
    pub result_format: &'static str,
}

impl GenerationBody {
    pub fn text(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            input: GenerationInput {
                prompt: prompt.to_string(),
            },
            parameters: GenerationParameters {
                result_format: "text",
            },
        }
    }
}

/// Successful generation reply. Every field may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationReply {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub output: Option<GenerationOutput>,
    #[serde(default)]
    pub usage: Option<ReplyUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReplyUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Model listing reply. Entries stay untyped so one malformed entry can be
/// skipped without rejecting the page.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelListReply {
    #[serde(default)]
    pub output: Option<ModelListOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelListOutput {
    #[serde(default)]
    pub models: Vec<serde_json::Value>,
    #[serde(default)]
    pub total: u64,
}
