//! Request attributes captured for diagnostic logging.
//!
//! # Responsibilities
//! - Snapshot remote address, method, content type, URL and user agent
//! - Render the `[REQ ...]` log segment
//!
//! # Design Decisions
//! - Captured before the handler runs, so the snapshot survives a panic
//! - Missing headers render as `None`
//! - The correlation-ID slot is reserved as the literal `no-request-id`

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap, Request, Uri},
};

/// Placeholder for the request-correlation slot of the log format.
pub const NO_REQUEST_ID: &str = "no-request-id";

/// Snapshot of the inbound request used by the diagnostic logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub remote_addr: Option<String>,
    pub method: String,
    pub content_type: Option<String>,
    pub url: String,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Capture context from a full request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self::capture(
            remote_addr,
            request.method().as_str(),
            &url_of(request.uri(), request.headers()),
            request.headers(),
        )
    }

    /// Capture context from request parts (e.g. inside an extractor).
    pub fn from_parts(parts: &Parts) -> Self {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self::capture(
            remote_addr,
            parts.method.as_str(),
            &url_of(&parts.uri, &parts.headers),
            &parts.headers,
        )
    }

    fn capture(remote_addr: Option<String>, method: &str, url: &str, headers: &HeaderMap) -> Self {
        Self {
            remote_addr,
            method: method.to_string(),
            content_type: header_value(headers, header::CONTENT_TYPE),
            url: url.to_string(),
            user_agent: header_value(headers, header::USER_AGENT),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

impl fmt::Display for RequestContext {
    /// Renders `<remote_addr> <method> <content_type> <url> "<user_agent>" no-request-id`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} \"{}\" {}",
            self.remote_addr.as_deref().unwrap_or("None"),
            self.method,
            self.content_type.as_deref().unwrap_or("None"),
            self.url,
            self.user_agent.as_deref().unwrap_or(""),
            NO_REQUEST_ID
        )
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Absolute URL when the Host header is known, otherwise the raw URI.
fn url_of(uri: &Uri, headers: &HeaderMap) -> String {
    if uri.scheme().is_some() {
        return uri.to_string();
    }
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, uri),
        None => uri.to_string(),
    }
}
