// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./qwenmux.toml` > `~/.config/qwenmux/qwenmux.toml` >
//! `/etc/qwenmux/qwenmux.toml` with environment variable overrides via `QWENMUX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::QwenmuxConfig;

/// Section names recognized in `QWENMUX_<SECTION>_<KEY>` environment variables.
const ENV_SECTIONS: &[&str] = &[
    "server",
    "dashscope",
    "routing",
    "catalog",
    "streaming",
    "logging",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/qwenmux/qwenmux.toml`
/// 3. `~/.config/qwenmux/qwenmux.toml`
/// 4. `./qwenmux.toml`
/// 5. `QWENMUX_*` environment variables
pub fn load_config() -> Result<QwenmuxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QwenmuxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QwenmuxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QwenmuxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QwenmuxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(QwenmuxConfig::default()))
        .merge(Toml::file("/etc/qwenmux/qwenmux.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("qwenmux/qwenmux.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("qwenmux.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `QWENMUX_ROUTING_LENGTH_THRESHOLD` must become
/// `routing.length_threshold`, not `routing.length.threshold`.
fn env_provider() -> Env {
    Env::prefixed("QWENMUX_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("server_port"), "server.port");
        assert_eq!(
            map_env_key("routing_length_threshold"),
            "routing.length_threshold"
        );
        assert_eq!(
            map_env_key("streaming_chunk_delay_ms"),
            "streaming.chunk_delay_ms"
        );
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("nonsense_key"), "nonsense_key");
    }

    #[test]
    fn env_override_applies_through_figment_jail() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QWENMUX_SERVER_PORT", "9100");
            jail.set_env("QWENMUX_ROUTING_DEFAULT_MODEL", "qwen-plus");
            let config: QwenmuxConfig = Figment::new()
                .merge(Serialized::defaults(QwenmuxConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.routing.default_model, "qwen-plus");
            Ok(())
        });
    }
}
