//! Console logging setup.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Prefix every event with timestamp, level, application name, source location
//! - Pick the log level from config (`debug` wins over `log_level`)
//!
//! # Line format
//! ```text
//! [2024-11-28T00:10:30.123Z] [INFO] [DEMO] [src/observability/diagnostics.rs:210] [MSG ...] [REQ ...] [SVR ...]
//! ```

use std::fmt::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::AppConfig;

/// Event formatter producing `[ts] [LEVEL] [APP] [file:line] message`.
#[derive(Debug, Clone)]
pub struct ConsoleFormat {
    app_name: String,
}

impl ConsoleFormat {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_uppercase(),
        }
    }

    /// Render the line prefix for one event.
    pub fn prefix(
        &self,
        timestamp: DateTime<Utc>,
        level: &Level,
        file: Option<&str>,
        line: Option<u32>,
    ) -> String {
        format!(
            "[{}] [{}] [{}] [{}:{}] ",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            self.app_name,
            file.unwrap_or("unknown"),
            line.unwrap_or(0)
        )
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let prefix = self.prefix(Utc::now(), meta.level(), meta.file(), meta.line());
        writer.write_str(&prefix)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Default filter directive derived from config.
pub fn filter_directive(config: &AppConfig) -> String {
    let level = if config.debug {
        "debug".to_string()
    } else {
        config.observability.log_level.to_ascii_lowercase()
    };
    format!("demo_service={level},tower_http={level}")
}

/// Install the global subscriber. `RUST_LOG` overrides the config level.
pub fn init_logging(config: &AppConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(ConsoleFormat::new(&config.app_name)))
        .try_init()
}
