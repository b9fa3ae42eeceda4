//! Route handlers. Every handler answers with an [`ApiResponse`].

use axum::http::{Method, Uri};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::http::response::{ApiResponse, JsonObject};

/// Current UTC time in ISO 8601 with seconds precision, e.g. `2024-11-28T00:10:30Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `GET /healthcheck`
///
/// No `/api` prefix so it can be probed without any other wiring; meant to
/// be reachable only from inside the host or private network.
pub async fn healthcheck() -> ApiResponse {
    let mut data = JsonObject::new();
    data.insert("message".to_string(), Value::from("OK"));
    data.insert("timestamp".to_string(), Value::from(timestamp()));

    ApiResponse::new(200, Some("".into()), Some(data))
}

/// Any path no route matched. Only `GET` (and `HEAD`) is caught; other
/// methods get the 405 envelope.
pub async fn catchall(method: Method, uri: Uri) -> ApiResponse {
    if method != Method::GET && method != Method::HEAD {
        return method_not_allowed(method, uri).await;
    }
    let path = uri.path().strip_prefix('/').unwrap_or(uri.path());
    ApiResponse::error(404, format!("Endpoint /{path} not found."))
}

/// Known path, wrong method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiResponse {
    ApiResponse::error(405, format!("Method {} not allowed on {}.", method, uri.path()))
}
