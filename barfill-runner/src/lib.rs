//! barfill runner: everything around the engine that touches files or state.
//!
//! This crate builds on `barfill-core` to provide:
//! - Validation gateway for bars and orders
//! - Bar loading from CSV
//! - Bar-by-bar replay that carries pending orders forward
//! - Stop-limit formation tables checked against the engine
//! - TOML replay configuration with content-hashed run ids
//! - `tracing` subscriber setup

pub mod config;
pub mod data_loader;
pub mod formation;
pub mod gateway;
pub mod logging;
pub mod replay;
pub mod runner;

pub use config::{ConfigError, ReplayConfig, RunId};
pub use data_loader::{load_bars_csv, read_bars, LoadError};
pub use formation::{
    check_formation, load_formations, read_formations, BarType, FillCell, FillSource, Formation,
    FormationError, Scenario,
};
pub use gateway::{validate_bar, validate_bars, validate_order, validate_orders, ValidationError};
pub use logging::{init_logging, LogConfig, LogFormat, LoggingError};
pub use replay::{run_replay, ReplayResult};
pub use runner::{
    apply_log_config, run_from_config, run_from_config_observed, run_from_path, RunError, RunReport,
};
