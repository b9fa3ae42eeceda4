//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every field has a default so an empty file (or no file at all) is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Environment name (e.g., "production", "staging", "local").
    pub env: String,

    /// Port published to clients (docker/nginx side). Informational only.
    pub port_external: u16,

    /// Port the HTTP listener binds to inside the host/container.
    pub port_internal: u16,

    /// Application name, shown upper-cased in every log line.
    pub app_name: String,

    /// Enables debug-level logging.
    pub debug: bool,

    /// Application version reported in the server segment of log lines.
    pub version: String,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: "production".to_string(),
            port_external: 10000,
            port_internal: 9000,
            app_name: "DEMO".to_string(),
            debug: false,
            version: "v0.1.0".to_string(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listener.bind_host, self.port_internal)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). Overridden by `debug`.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
