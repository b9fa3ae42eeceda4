//! Error types shared across the service.

use std::backtrace::Backtrace;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::recovery;
use crate::observability::Failure;

/// Failure raised by a request handler.
///
/// Returning one from a handler is the same as an uncaught exception: the
/// error translator logs it once and the client receives a 500 envelope
/// whose message is the error's `Display` output.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let failure = Failure::from_error(&self).with_backtrace(&Backtrace::capture());
        recovery::failure_response(failure)
    }
}

/// Failure that stops the server itself (outside any request).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
