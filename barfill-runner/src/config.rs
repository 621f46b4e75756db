//! Serializable replay configuration.
//!
//! ```toml
//! bars = "bars.csv"
//!
//! [log]
//! level = "debug"
//! format = "json"
//!
//! [[orders]]
//! id = "1"
//! side = "BUY"
//! quantity = "100"
//! kind = { type = "STOP_LIMIT", stop_price = "151.00", limit_price = "152.00" }
//! ```

use crate::logging::LogConfig;
use barfill_core::domain::{Bar, Order};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Unique identifier for a replay run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Everything needed to reproduce a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Bar CSV. Relative paths resolve against the config file's directory
    /// when loaded with [`ReplayConfig::from_path`].
    pub bars: PathBuf,

    #[serde(default)]
    pub log: LogConfig,

    /// Initial working orders, evaluated from the first bar.
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl ReplayConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if config.bars.is_relative() {
            if let Some(dir) = path.parent() {
                config.bars = dir.join(&config.bars);
            }
        }
        Ok(config)
    }

    /// Deterministic id over the orders and the bars they run against.
    ///
    /// The bar file path and log settings are left out: the same orders over
    /// the same bars give the same id wherever the file lives.
    pub fn run_id(&self, bars: &[Bar]) -> Result<RunId, ConfigError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(serde_json::to_string(&self.orders)?.as_bytes());
        hasher.update(serde_json::to_string(bars)?.as_bytes());
        Ok(hasher.finalize().to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use barfill_core::domain::{OrderKind, OrderSide, Trail};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
bars = "bars.csv"

[log]
level = "debug"
format = "json"

[[orders]]
id = "1"
side = "BUY"
quantity = "100"
kind = { type = "STOP_LIMIT", stop_price = "151.00", limit_price = "152.00" }

[[orders.children]]
id = "2"
side = "SELL"
quantity = "100"
kind = { type = "LIMIT", limit_price = "155.00" }

[[orders]]
id = "3"
side = "SELL"
quantity = "50"
kind = { type = "TRAILING_STOP_MARKET", trail = { percent = "2.5" } }
"#;

    #[test]
    fn parses_orders_and_log_settings() {
        let config = ReplayConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.bars, PathBuf::from("bars.csv"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.orders.len(), 2);

        let entry = &config.orders[0];
        assert_eq!(entry.side, OrderSide::Buy);
        assert_eq!(
            entry.kind,
            OrderKind::StopLimit {
                stop_price: dec!(151.00),
                limit_price: dec!(152.00)
            }
        );
        assert_eq!(entry.children.len(), 1);

        assert_eq!(
            config.orders[1].kind,
            OrderKind::TrailingStopMarket {
                trail: Trail::Percent(dec!(2.5)),
                state: None
            }
        );
    }

    #[test]
    fn unknown_order_kind_is_a_parse_error() {
        let text = r#"
bars = "bars.csv"
[[orders]]
id = "1"
side = "BUY"
quantity = "1"
kind = { type = "ICEBERG" }
"#;
        assert!(matches!(
            ReplayConfig::from_toml_str(text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_stable_and_sensitive_to_orders() {
        let bars = vec![Bar::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap(),
            dec!(148),
            dec!(152),
            dec!(146),
            dec!(150),
            1,
        )];
        let config = ReplayConfig::from_toml_str(SAMPLE).unwrap();
        let a = config.run_id(&bars).unwrap();
        assert_eq!(a, config.run_id(&bars).unwrap());
        assert_eq!(a.len(), 64);

        let mut moved = config.clone();
        moved.bars = PathBuf::from("/elsewhere/bars.csv");
        assert_eq!(a, moved.run_id(&bars).unwrap());

        let mut changed = config;
        changed.orders.pop();
        assert_ne!(a, changed.run_id(&bars).unwrap());
    }
}
