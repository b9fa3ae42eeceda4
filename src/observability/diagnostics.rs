//! Diagnostic log lines with request and server context.
//!
//! # Line format
//! ```text
//! [MSG <message><trace>] [REQ null] [SVR <ip>:<ext>,<int> <env> <hostname> <version>]
//! [MSG <message><trace>] [REQ <addr> <method> <ctype> <url> "<ua>" no-request-id] [SVR ...]
//! ```
//!
//! # Design Decisions
//! - One event is always one line: newlines inside traces become `\n`
//! - Hostname and IP are resolved on every call, never cached
//! - Resolution failures degrade to sentinels instead of erroring
//! - The logger holds no mutable state; clones are cheap and independent

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::http::request::RequestContext;

/// IP substituted when the hostname cannot be resolved.
pub const UNKNOWN_IP: &str = "0.0.0.0";

/// Hostname substituted when the OS refuses to report one.
pub const UNKNOWN_HOST: &str = "unknown-host";

/// Source of host identity for the server segment.
pub trait HostResolver: Send + Sync {
    /// Hostname of the machine, if it can be read.
    fn hostname(&self) -> Option<String>;

    /// IPv4 address the hostname resolves to, if any.
    fn resolve_ip(&self, hostname: &str) -> Option<IpAddr>;
}

/// Resolver backed by the OS hostname and resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn hostname(&self) -> Option<String> {
        hostname::get()
            .ok()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    }

    fn resolve_ip(&self, hostname: &str) -> Option<IpAddr> {
        (hostname, 0)
            .to_socket_addrs()
            .ok()?
            .map(|addr| addr.ip())
            .find(IpAddr::is_ipv4)
    }
}

/// Server identity rendered into every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContext {
    pub ip: String,
    pub port_external: u16,
    pub port_internal: u16,
    pub env: String,
    pub hostname: String,
    pub version: String,
}

impl fmt::Display for ServerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{},{} {} {} {}",
            self.ip, self.port_external, self.port_internal, self.env, self.hostname, self.version
        )
    }
}

/// A captured failure: what went wrong and where.
///
/// `Display` yields only the message, which is what clients get to see.
/// [`Failure::render`] yields the full multi-line trace for the server log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: String,
    message: String,
    location: Option<String>,
    causes: Vec<String>,
    backtrace: Option<String>,
}

impl Failure {
    /// Capture an error value and its `source()` chain.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
            location: None,
            causes,
            backtrace: None,
        }
    }

    /// Capture a panic payload as returned by `catch_unwind`. Location and
    /// frames come from the panic hook, see [`super::panics::catch_panic`].
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        Self {
            kind: "panic".to_string(),
            message,
            location: None,
            causes: Vec::new(),
            backtrace: None,
        }
    }

    /// Attach a backtrace. Ignored unless it was actually captured
    /// (`RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enabled).
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.backtrace = Some(backtrace.to_string());
        }
        self
    }

    /// Record where the failure was raised (`file:line:column`).
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Full multi-line trace: kind and message, location, causes, then frames.
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}\n", self.kind, self.message);
        if let Some(location) = &self.location {
            out.push_str("  at ");
            out.push_str(location);
            out.push('\n');
        }
        for cause in &self.causes {
            out.push_str("Caused by: ");
            out.push_str(cause);
            out.push('\n');
        }
        if let Some(backtrace) = &self.backtrace {
            out.push_str("Stack backtrace:\n");
            out.push_str(backtrace);
        }
        out
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collapse line breaks to the two characters `\n`.
fn single_line(text: &str) -> String {
    text.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n")
}

/// Formats and emits diagnostic log lines.
#[derive(Clone)]
pub struct DiagnosticLogger {
    config: Arc<AppConfig>,
    resolver: Arc<dyn HostResolver>,
}

impl fmt::Debug for DiagnosticLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticLogger")
            .field("app_name", &self.config.app_name)
            .finish_non_exhaustive()
    }
}

impl DiagnosticLogger {
    /// Create a logger that resolves host identity through the OS.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_resolver(config, Arc::new(SystemResolver))
    }

    /// Create a logger with a custom host resolver.
    pub fn with_resolver(config: Arc<AppConfig>, resolver: Arc<dyn HostResolver>) -> Self {
        Self { config, resolver }
    }

    /// Log an informational message.
    pub fn info(&self, request: Option<&RequestContext>, message: &str) {
        let line = self.format_message(request, message, None);
        tracing::info!("{}", line);
    }

    /// Log an error message with an optional failure trace.
    pub fn error(&self, request: Option<&RequestContext>, message: &str, failure: Option<&Failure>) {
        let line = self.format_message(request, message, failure);
        tracing::error!("{}", line);
    }

    /// Resolve the server segment. Never fails.
    pub fn server_context(&self) -> ServerContext {
        let hostname = self.resolver.hostname();
        let ip = hostname
            .as_deref()
            .and_then(|name| self.resolver.resolve_ip(name))
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        ServerContext {
            ip,
            port_external: self.config.port_external,
            port_internal: self.config.port_internal,
            env: self.config.env.clone(),
            hostname: hostname.unwrap_or_else(|| UNKNOWN_HOST.to_string()),
            version: self.config.version.clone(),
        }
    }

    /// Build the single-line message body for one log event.
    pub fn format_message(
        &self,
        request: Option<&RequestContext>,
        message: &str,
        failure: Option<&Failure>,
    ) -> String {
        let mut result = message.to_string();
        if let Some(failure) = failure {
            result.push_str(&single_line(&failure.render()));
        }

        let request_segment = match request {
            Some(request) => format!("[REQ {}]", request),
            None => "[REQ null]".to_string(),
        };

        format!("[MSG {}] {} [SVR {}]", result, request_segment, self.server_context())
    }
}
