//! Response envelope shared by every endpoint.
//!
//! # Wire shape
//! ```text
//! {
//!   "data":  <object or null>,
//!   "error": <null or {"message": <string>, ...}>,
//!   "meta":  {"status_code": <integer>, "version": "v0.1.0"}
//! }
//! ```
//!
//! # Design Decisions
//! - `data` and `error` are never both set; an error always wins
//! - `meta.version` tracks the envelope contract, not the application
//! - Construction cannot fail

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Version tag of the envelope contract itself.
pub const ENVELOPE_VERSION: &str = "v0.1.0";

/// JSON object used for `data` payloads and structured errors.
pub type JsonObject = Map<String, Value>;

/// What a caller passes to signal an error response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorIndication {
    /// Human-readable message. An empty string means "no error".
    PlainMessage(String),
    /// Caller-built error object, used verbatim.
    StructuredError(JsonObject),
}

impl From<&str> for ErrorIndication {
    fn from(message: &str) -> Self {
        Self::PlainMessage(message.to_string())
    }
}

impl From<String> for ErrorIndication {
    fn from(message: String) -> Self {
        Self::PlainMessage(message)
    }
}

impl From<JsonObject> for ErrorIndication {
    fn from(error: JsonObject) -> Self {
        Self::StructuredError(error)
    }
}

/// Envelope metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub status_code: u16,
    pub version: &'static str,
}

/// Standardized response returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    data: Option<JsonObject>,
    error: Option<JsonObject>,
    meta: Meta,
}

impl ApiResponse {
    /// Build an envelope.
    ///
    /// Any non-empty error indication nulls out `data`, whatever was passed.
    pub fn new(status_code: u16, error: Option<ErrorIndication>, data: Option<JsonObject>) -> Self {
        let error = match error {
            None => None,
            Some(ErrorIndication::PlainMessage(message)) if message.is_empty() => None,
            Some(ErrorIndication::PlainMessage(message)) => {
                let mut object = JsonObject::new();
                object.insert("message".to_string(), Value::String(message));
                Some(object)
            }
            Some(ErrorIndication::StructuredError(object)) => Some(object),
        };

        let data = if error.is_some() { None } else { data };

        Self {
            data,
            error,
            meta: Meta {
                status_code,
                version: ENVELOPE_VERSION,
            },
        }
    }

    /// Error envelope with `{"message": message}`.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, Some(ErrorIndication::PlainMessage(message.into())), None)
    }

    pub fn data(&self) -> Option<&JsonObject> {
        self.data.as_ref()
    }

    pub fn error_object(&self) -> Option<&JsonObject> {
        self.error.as_ref()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn status_code(&self) -> u16 {
        self.meta.status_code
    }

    /// The three top-level keys as a plain JSON value.
    pub fn to_value(&self) -> Value {
        // Maps with string keys always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Body and status code, ready for the transport layer.
    pub fn serialize(&self) -> (Value, u16) {
        (self.to_value(), self.meta.status_code)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let (body, status_code) = self.serialize();
        let status =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
