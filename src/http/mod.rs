//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → recovery.rs (capture request context, catch failures)
//!     → handlers.rs / websocket.rs
//!     → response.rs (envelope + status code)
//!     → Send to client
//! ```

pub mod handlers;
pub mod recovery;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::RequestContext;
pub use response::{ApiResponse, ErrorIndication, JsonObject};
pub use server::{AppState, HttpServer};
