//! Execution result: fills and pending orders produced by one `execute` call.

use super::fill::Fill;
use super::ids::OrderId;
use super::order::Order;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    #[error("execution result has neither fills nor pending orders")]
    EmptyResult,
}

/// Overall outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Nothing filled; the order waits for the next bar.
    Pending,
    /// Every node filled.
    Filled,
    /// A parent filled but at least one child is still waiting.
    Partial,
}

/// An order to resubmit on the next bar, with the parent id to pass back
/// into `execute` so fill chains stay linked across bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order: Order,
    pub parent_id: Option<OrderId>,
}

/// Fills and pending orders in parent-first, declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub fills: Vec<Fill>,
    pub pending: Vec<PendingOrder>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Result<ExecutionStatus, ResultError> {
        match (self.fills.is_empty(), self.pending.is_empty()) {
            (true, true) => Err(ResultError::EmptyResult),
            (true, false) => Ok(ExecutionStatus::Pending),
            (false, true) => Ok(ExecutionStatus::Filled),
            (false, false) => Ok(ExecutionStatus::Partial),
        }
    }

    /// Fills that executed quantity (market and limit nodes), skipping the
    /// activation records of trigger kinds.
    pub fn executions(&self) -> impl Iterator<Item = &Fill> {
        self.fills.iter().filter(|f| !f.is_trigger())
    }
}
