//! Single replay runner: config in, fills and leftover orders out.

use crate::config::{ConfigError, ReplayConfig, RunId};
use crate::data_loader::{load_bars_csv, LoadError};
use crate::gateway::{validate_orders, ValidationError};
use crate::logging::{init_logging, LogConfig, LoggingError};
use crate::replay::{run_replay, ReplayResult};
use barfill_core::engine::{ExecutionObserver, TracingObserver};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid orders: {0}")]
    Orders(#[from] ValidationError),
    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),
}

/// Result of one run, keyed by its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub result: ReplayResult,
}

/// Load bars, validate orders and replay, logging engine events via `tracing`.
pub fn run_from_config(config: &ReplayConfig) -> Result<RunReport, RunError> {
    run_from_config_observed(config, &mut TracingObserver)
}

pub fn run_from_config_observed(
    config: &ReplayConfig,
    observer: &mut dyn ExecutionObserver,
) -> Result<RunReport, RunError> {
    validate_orders(&config.orders)?;
    let bars = load_bars_csv(&config.bars)?;
    let run_id = config.run_id(&bars)?;

    let span = tracing::info_span!("replay", run_id = %run_id);
    let _enter = span.enter();
    tracing::info!(
        bars = bars.len(),
        orders = config.orders.len(),
        source = %config.bars.display(),
        "starting replay"
    );

    let result = run_replay(&bars, config.orders.clone(), observer);
    Ok(RunReport { run_id, result })
}

/// Install the subscriber from the config's `[log]` table.
///
/// A subscriber that is already installed (by the host program or an earlier
/// run) stays in place; an invalid filter is an error.
pub fn apply_log_config(log: &LogConfig) -> Result<(), RunError> {
    match init_logging(log) {
        Err(LoggingError::AlreadyInitialized(reason)) => {
            tracing::debug!(%reason, "keeping existing subscriber");
            Ok(())
        }
        other => Ok(other?),
    }
}

/// Read a TOML config from disk, set up logging from its `[log]` table and run it.
pub fn run_from_path(path: &Path) -> Result<RunReport, RunError> {
    let config = ReplayConfig::from_path(path)?;
    apply_log_config(&config.log)?;
    run_from_config(&config)
}
