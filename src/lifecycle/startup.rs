//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener on `listener.bind_host:port_internal`
//! - Start the signal watcher
//! - Run the HTTP server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to `main`, which logs it as fatal
//! - Config and logger arrive fully built; nothing here reads globals

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::DiagnosticLogger;

/// Serve until SIGINT/SIGTERM.
pub async fn run(config: Arc<AppConfig>, logger: DiagnosticLogger) -> Result<(), ServerError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(ServerError::Serve)?;

    logger.info(
        None,
        &format!(
            "{} {} listening on {} (external port {}).",
            config.app_name, config.version, local_addr, config.port_external
        ),
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let signal_logger = logger.clone();
    tokio::spawn(async move {
        let name = signals::wait_for_signal().await;
        signal_logger.info(None, &format!("{name} received, shutting down."));
        shutdown.trigger();
    });

    HttpServer::new(config, logger.clone())
        .run(listener, server_shutdown)
        .await?;

    logger.info(None, "Shutdown complete.");
    Ok(())
}
