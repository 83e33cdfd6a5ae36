// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for qwenmux.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level qwenmux configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QwenmuxConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote DashScope API settings.
    #[serde(default)]
    pub dashscope: DashscopeConfig,

    /// Model selection heuristics.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Model catalog sources.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Streaming response emulation.
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// DashScope API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashscopeConfig {
    /// Base URL of the DashScope REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient statuses (429, 500, 502, 503).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fallback key for the `ask` and `models` commands. The HTTP gateway
    /// always uses the caller's key.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for DashscopeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://dashscope.aliyuncs.com/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    1
}

/// Model selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Model used for simple questions and as the fallback for every failure.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Questions longer than this many characters are treated as complex.
    #[serde(default = "default_length_threshold")]
    pub length_threshold: usize,

    /// Any of these substrings marks a question as complex.
    #[serde(default = "default_complex_keywords")]
    pub complex_keywords: Vec<String>,

    /// Plain-text evaluation prompt with a `{question}` placeholder.
    #[serde(default = "default_prompt_template_path")]
    pub prompt_template_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            length_threshold: default_length_threshold(),
            complex_keywords: default_complex_keywords(),
            prompt_template_path: default_prompt_template_path(),
        }
    }
}

fn default_model() -> String {
    "qwen-turbo-latest".to_string()
}

fn default_length_threshold() -> usize {
    100
}

fn default_complex_keywords() -> Vec<String> {
    [
        "分析", "比较", "解释", "为什么", "如何", "机制", "原理", "政策", "影响", "评估", "趋势",
        "研究", "法律",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_prompt_template_path() -> String {
    "assets/model_selector_prompt.txt".to_string()
}

/// Model catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// JSON file holding the static model catalog.
    #[serde(default = "default_catalog_path")]
    pub path: String,

    /// Minimum seconds between remote catalog refreshes. `0` refreshes on
    /// every complex selection.
    #[serde(default)]
    pub refresh_interval_secs: u64,

    /// Page size requested from the model listing endpoint.
    #[serde(default = "default_remote_page_size")]
    pub remote_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            refresh_interval_secs: 0,
            remote_page_size: default_remote_page_size(),
        }
    }
}

fn default_catalog_path() -> String {
    "assets/models.json".to_string()
}

fn default_remote_page_size() -> u32 {
    100
}

/// Streaming emulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamingConfig {
    /// Delay between emitted chunks, in milliseconds.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Append a `data: [DONE]` event after the terminal chunk.
    #[serde(default = "default_done_sentinel")]
    pub done_sentinel: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_delay_ms: default_chunk_delay_ms(),
            done_sentinel: default_done_sentinel(),
        }
    }
}

fn default_chunk_delay_ms() -> u64 {
    10
}

fn default_done_sentinel() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
