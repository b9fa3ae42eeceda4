//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, error translator, lifecycle:
//!     → diagnostics.rs (one-line message with [MSG] [REQ] [SVR] segments)
//!     → tracing event (INFO / ERROR)
//!     → logging.rs (console formatter adds [ts] [LEVEL] [APP] [file:line])
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The logger is an injected value, not a global
//! - Logging never fails the request path

pub mod diagnostics;
pub mod logging;
pub mod panics;

pub use diagnostics::{DiagnosticLogger, Failure, HostResolver, ServerContext, SystemResolver};
pub use panics::{catch_panic, install_panic_hook};
