//! Demo service entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http::server ─▶ http::recovery ─▶ handlers │
//!                             │                        │                     │
//!     Client Response         │                        ▼                     │
//!     ◀───────────────────────┼── ApiResponse ◀── envelope / 500 envelope    │
//!                             │                        │                     │
//!                             │                        ▼                     │
//!                             │            observability::diagnostics        │
//!                             │          [MSG ...] [REQ ...] [SVR ...]       │
//!                             └──────────────────────────────────────────────┘
//! ```
//!
//! Startup is two-phase: config and logger are built here, then injected
//! into the server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use demo_service::config;
use demo_service::http::recovery;
use demo_service::lifecycle::startup;
use demo_service::observability::{install_panic_hook, logging, DiagnosticLogger};

#[derive(Parser)]
#[command(name = "demo-service")]
#[command(about = "Health check service with envelope responses", long_about = None)]
struct Cli {
    /// Optional TOML config file; DEMO_* environment variables override it.
    #[arg(short, long, env = "DEMO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Arc::new(config::load(cli.config.as_deref())?);
    logging::init_logging(&config)?;

    let logger = DiagnosticLogger::new(config.clone());
    install_panic_hook();

    if let Err(e) = startup::run(config, logger.clone()).await {
        recovery::report_fatal(&logger, &e);
        std::process::exit(1);
    }

    Ok(())
}
