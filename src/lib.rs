//! Minimal HTTP service: health check, catch-all, response envelope and
//! request-aware diagnostic logging.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ServerError};
pub use http::{ApiResponse, ErrorIndication, HttpServer};
pub use lifecycle::Shutdown;
pub use observability::DiagnosticLogger;
