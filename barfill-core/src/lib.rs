//! barfill core: conservative order-fill reconstruction from OHLCV bars.
//!
//! - Domain types (bars, orders, fills, execution results)
//! - Per-kind fill rules for market, limit and stop orders
//! - Two-phase stop-limit evaluation
//! - Trailing stops with carried state and dual-trigger checks
//! - Recursive parent/child evaluation with an injectable observer

pub mod domain;
pub mod engine;

pub use engine::{execute, execute_observed};
