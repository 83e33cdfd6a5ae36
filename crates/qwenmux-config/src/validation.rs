// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty model names, sane page sizes, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::QwenmuxConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &QwenmuxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    let base_url = config.dashscope.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("dashscope.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    if config.dashscope.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dashscope.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.routing.default_model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "routing.default_model must not be empty".to_string(),
        });
    }

    for (i, keyword) in config.routing.complex_keywords.iter().enumerate() {
        if keyword.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("routing.complex_keywords[{i}] must not be empty"),
            });
        }
    }

    if config.routing.prompt_template_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "routing.prompt_template_path must not be empty".to_string(),
        });
    }

    let page_size = config.catalog.remote_page_size;
    if !(1..=100).contains(&page_size) {
        errors.push(ConfigError::Validation {
            message: format!("catalog.remote_page_size must be between 1 and 100, got {page_size}"),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
