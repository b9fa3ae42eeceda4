//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (error translation, tracing)
//! - Bind server to listener
//! - Serve until the shutdown signal fires

use axum::{
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::http::{handlers, recovery, websocket};
use crate::observability::DiagnosticLogger;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub logger: DiagnosticLogger,
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server from an already-built config and logger.
    pub fn new(config: Arc<AppConfig>, logger: DiagnosticLogger) -> Self {
        let state = AppState { config, logger };
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/healthcheck", get(handlers::healthcheck))
            .route("/ws", get(websocket::ws_handler))
            .fallback(handlers::catchall)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .layer(middleware::from_fn_with_state(state.clone(), recovery::translate_errors))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ServerError::Serve)?;
        tracing::debug!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(ServerError::Serve)?;

        self.state.logger.info(None, "HTTP server stopped.");
        Ok(())
    }
}
