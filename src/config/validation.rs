//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports)
//! - Validate the listener host parses as an IP address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("listener.bind_host '{0}' is not a valid IP address")]
    InvalidBindHost(String),

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port_external == 0 {
        errors.push(ValidationError::ZeroValue { field: "port_external" });
    }
    if config.port_internal == 0 {
        errors.push(ValidationError::ZeroValue { field: "port_internal" });
    }
    if config.app_name.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "app_name" });
    }
    if config.env.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "env" });
    }
    if config.listener.bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidBindHost(config.listener.bind_host.clone()));
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.port_internal = 0;
        config.app_name = "  ".into();
        config.listener.bind_host = "not-an-ip".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroValue { field: "port_internal" }));
        assert!(errors.contains(&ValidationError::Empty { field: "app_name" }));
        assert!(errors.contains(&ValidationError::InvalidBindHost("not-an-ip".into())));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = AppConfig::default();
        config.observability.log_level = "WARN".into();
        assert!(validate_config(&config).is_ok());

        config.observability.log_level = "loud".into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidLogLevel("loud".into())]
        );
    }
}
