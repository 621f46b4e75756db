//! Logging configuration and initialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("global subscriber already set: {0}")]
    AlreadyInitialized(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    Pretty,
    /// Single-line output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Logging configuration, usually the `[log]` table of a replay config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set, e.g. `"info"` or
    /// `"barfill_runner=debug,barfill_core=trace"`.
    pub level: String,
    pub format: LogFormat,
    /// Include target (module path)
    pub include_target: bool,
    /// Omit timestamps, for reproducible log output.
    pub without_time: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_target: true,
            without_time: false,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// `RUST_LOG` wins over the configured level. The configured level is
    /// checked either way, so a bad `[log]` table never goes unnoticed.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let configured = EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            filter: self.level.clone(),
            reason: e.to_string(),
        })?;
        Ok(EnvFilter::try_from_default_env().unwrap_or(configured))
    }
}

/// Install the global `tracing` subscriber described by `config`.
///
/// # Errors
///
/// Fails on an unparsable filter or when a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.include_target);

    let result = match (config.format, config.without_time) {
        (LogFormat::Json, false) => builder.json().try_init(),
        (LogFormat::Json, true) => builder.json().without_time().try_init(),
        (LogFormat::Pretty, false) => builder.pretty().try_init(),
        (LogFormat::Pretty, true) => builder.pretty().without_time().try_init(),
        (LogFormat::Compact, false) => builder.compact().try_init(),
        (LogFormat::Compact, true) => builder.compact().without_time().try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
