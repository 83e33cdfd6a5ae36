// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `qwenmux serve` - run the HTTP gateway until a shutdown signal arrives.

use qwenmux_config::QwenmuxConfig;
use qwenmux_core::QwenmuxError;
use qwenmux_gateway::{GatewayState, StreamSettings, start_server};
use tracing::info;

use crate::app::build_orchestrator;
use crate::shutdown;

/// Wire the pipeline and serve `/v1/chat/completions`.
pub async fn run_serve(config: QwenmuxConfig) -> Result<(), QwenmuxError> {
    let orchestrator = build_orchestrator(&config)?;
    let state = GatewayState::new(orchestrator, StreamSettings::from(&config.streaming));

    let cancel = shutdown::install_signal_handler();

    info!(
        host = %config.server.host,
        port = config.server.port,
        base_url = %config.dashscope.base_url,
        "qwenmux starting"
    );
    start_server(&config.server, state, cancel).await?;
    info!("qwenmux stopped");
    Ok(())
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise qwenmux crates log at `log_level`
/// and everything else at `warn`. Output goes to stderr so `ask` and
/// `models` keep stdout for their results.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qwenmux={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
