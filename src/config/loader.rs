//! Configuration loading from disk and the process environment.

use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment variable the service reads.
pub const ENV_PREFIX: &str = "DEMO_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}: expected an integer")]
    EnvVar { var: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the full configuration: defaults, then the optional file, then
/// `DEMO_*` environment variables. Validation runs on the final result.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with(path, |key| env::var(key).ok())
}

/// [`load`] with an explicit variable lookup in place of the process
/// environment.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` receives the full variable name (e.g. `DEMO_ENV`) so tests can
/// supply values without touching the real process environment.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = var("ENV") {
        config.env = value;
    }
    if let Some((key, value)) = var("PORT_EXTERNAL") {
        config.port_external = parse_int(&key, &value)?;
    }
    if let Some((key, value)) = var("PORT_INTERNAL") {
        config.port_internal = parse_int(&key, &value)?;
    }
    if let Some((_, value)) = var("APP_NAME") {
        config.app_name = value;
    }
    if let Some((key, value)) = var("DEBUG") {
        // Only the literal integer 1 enables debug.
        config.debug = parse_int::<i64>(&key, &value)? == 1;
    }

    Ok(())
}

fn parse_int<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvVar {
        var: var.to_string(),
        value: value.to_string(),
    })
}
