//! Error translation at the request boundary.
//!
//! # Responsibilities
//! - Catch handler failures (returned `AppError`s and panics)
//! - Log each failure exactly once with the request context
//! - Replace the response with a 500 envelope carrying only the message
//! - Report fatal failures outside any request
//!
//! # Data Flow
//! ```text
//! request → translate_errors (capture RequestContext)
//!     → handler
//!         Ok(ApiResponse)                  → pass through
//!         Err(AppError) → UncaughtFailure  → log ERROR, pass 500 envelope through
//!         panic         → catch_panic      → log ERROR, 500 envelope
//! ```

use std::error::Error;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestContext;
use crate::http::response::{ApiResponse, ErrorIndication};
use crate::http::server::AppState;
use crate::observability::{catch_panic, DiagnosticLogger, Failure};

pub const UNCAUGHT_IN_APP: &str = "Uncaught exception in app.";
pub const UNCAUGHT_IN_MAIN: &str = "Uncaught exception in main thread.";

/// Message used when a failure stringifies to nothing.
const FALLBACK_MESSAGE: &str = "Internal Server Error";

/// Response extension marking a handler failure that still has to be logged.
#[derive(Debug, Clone)]
pub struct UncaughtFailure(pub Failure);

fn envelope_for(failure: &Failure) -> ApiResponse {
    let message = match failure.message() {
        "" => FALLBACK_MESSAGE.to_string(),
        message => message.to_string(),
    };
    ApiResponse::new(500, Some(ErrorIndication::PlainMessage(message)), None)
}

/// 500 envelope for `failure`, tagged for [`translate_errors`] to log.
pub fn failure_response(failure: Failure) -> Response {
    let mut response = envelope_for(&failure).into_response();
    response.extensions_mut().insert(UncaughtFailure(failure));
    response
}

/// Middleware turning every uncaught handler failure into a logged 500.
pub async fn translate_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::from_request(&request);

    match catch_panic(next.run(request)).await {
        Ok(mut response) => {
            if let Some(UncaughtFailure(failure)) = response.extensions_mut().remove() {
                state.logger.error(Some(&context), UNCAUGHT_IN_APP, Some(&failure));
            }
            response
        }
        Err(failure) => {
            state.logger.error(Some(&context), UNCAUGHT_IN_APP, Some(&failure));
            envelope_for(&failure).into_response()
        }
    }
}

/// Log a failure that escaped the main task. The caller decides whether to exit.
pub fn report_fatal<E>(logger: &DiagnosticLogger, error: &E)
where
    E: Error + 'static,
{
    logger.error(None, UNCAUGHT_IN_MAIN, Some(&Failure::from_error(error)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::{AppError, AppResult};
    use crate::observability::install_panic_hook;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn state() -> AppState {
        let config = Arc::new(AppConfig::default());
        AppState {
            logger: DiagnosticLogger::new(config.clone()),
            config,
        }
    }

    async fn failing() -> AppResult<ApiResponse> {
        Err(AppError::Internal("database exploded".into()))
    }

    async fn panicking() -> ApiResponse {
        panic!("handler blew up");
    }

    async fn fine() -> ApiResponse {
        ApiResponse::error(404, "nope")
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/fail", get(failing))
            .route("/panic", get(panicking))
            .route("/fine", get(fine))
            .layer(middleware::from_fn_with_state(state.clone(), translate_errors))
            .with_state(state)
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = HttpRequest::builder()
            .uri(uri)
            .header("user-agent", "recovery-test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn uncaught_lines(lines: &[&str]) -> usize {
        lines
            .iter()
            .filter(|line| line.contains("ERROR") && line.contains(UNCAUGHT_IN_APP))
            .count()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_returned_error_logged_once() {
        let (status, body) = call(app(state()), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "data": null,
                "error": {"message": "database exploded"},
                "meta": {"status_code": 500, "version": "v0.1.0"}
            })
        );
        logs_assert(|lines: &[&str]| match uncaught_lines(lines) {
            1 => Ok(()),
            n => Err(format!("expected one uncaught line, got {n}")),
        });
        assert!(logs_contain("\"recovery-test\" no-request-id"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_panic_becomes_500() {
        let (status, body) = call(app(state()), "/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], json!("handler blew up"));
        assert_eq!(body["data"], Value::Null);
        logs_assert(|lines: &[&str]| match uncaught_lines(lines) {
            1 => Ok(()),
            n => Err(format!("expected one uncaught line, got {n}")),
        });
    }

    #[tokio::test]
    #[traced_test]
    async fn test_normal_response_not_logged() {
        let (status, body) = call(app(state()), "/fine").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], json!("nope"));
        assert!(!logs_contain(UNCAUGHT_IN_APP));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_panic_line_carries_location_and_frames() {
        install_panic_hook();

        call(app(state()), "/panic").await;

        logs_assert(|lines: &[&str]| {
            let line = lines
                .iter()
                .find(|line| line.contains(UNCAUGHT_IN_APP))
                .ok_or("no uncaught line")?;
            if !line.contains(&format!("panic: handler blew up\\n  at {}:", file!())) {
                return Err(format!("panic location missing: {line}"));
            }
            if !line.contains("Stack backtrace:") || !line.contains("[REQ ") {
                return Err(format!("trace not on the request line: {line}"));
            }
            Ok(())
        });
    }

    #[test]
    fn test_empty_failure_message_gets_fallback() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::new());
        let envelope = envelope_for(&Failure::from_panic(payload.as_ref()));
        assert_eq!(envelope.to_value()["error"]["message"], json!(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_report_fatal_has_null_request() {
        let state = state();
        let error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");

        report_fatal(&state.logger, &error);

        assert!(logs_contain(UNCAUGHT_IN_MAIN));
        assert!(logs_contain("[REQ null]"));
    }
}
