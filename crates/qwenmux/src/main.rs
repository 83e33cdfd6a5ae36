// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! qwenmux - a model-routing proxy for DashScope.
//!
//! This is the binary entry point.

mod app;
mod ask;
mod models;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// qwenmux - a model-routing proxy for DashScope.
#[derive(Parser, Debug)]
#[command(name = "qwenmux", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the OpenAI-compatible HTTP gateway.
    Serve,
    /// Answer a single question locally and print usage and timings.
    Ask {
        /// The question to answer.
        question: String,
        /// DashScope API key (defaults to DASHSCOPE_API_KEY).
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List the models reported by the remote API.
    Models {
        /// DashScope API key (defaults to DASHSCOPE_API_KEY).
        #[arg(long)]
        api_key: Option<String>,
        /// Print catalog-compatible JSON instead of a plain list.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => qwenmux_config::load_and_validate_path(path),
        None => qwenmux_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            qwenmux_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.logging.level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Ask { question, api_key }) => ask::run_ask(config, &question, api_key).await,
        Some(Commands::Models { api_key, json }) => models::run_models(config, api_key, json).await,
        None => {
            println!("qwenmux: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
