//! Execution engine: evaluate one order against one bar.
//!
//! `execute` is pure. It never mutates the caller's order; trailing stops
//! hand their updated state back through the pending copy in the result.

mod executor;
pub mod observer;
pub mod stop_limit;
pub mod trailing;
pub mod trigger;

pub use observer::{ExecutionObserver, NoopObserver, ObservedEvent, RecordingObserver, TracingObserver};
pub use stop_limit::StopLimitPhase;
pub use trailing::TrailingStep;
pub use trigger::TriggerResult;

use crate::domain::{Bar, ExecutionResult, Order, OrderId};
use executor::{evaluate, Resolution};

/// Evaluate `order` (and any children it fills into) against `bar`.
///
/// `parent_id` is `None` for top-level orders. When resubmitting a pending
/// order, pass back the parent id it was returned with.
pub fn execute(order: &Order, bar: &Bar, parent_id: Option<&OrderId>) -> ExecutionResult {
    execute_observed(order, bar, parent_id, &mut NoopObserver)
}

/// Same as [`execute`], reporting each trigger, fill and pending order to `observer`.
pub fn execute_observed(
    order: &Order,
    bar: &Bar,
    parent_id: Option<&OrderId>,
    observer: &mut dyn ExecutionObserver,
) -> ExecutionResult {
    let mut result = ExecutionResult::new();
    evaluate(order, bar, parent_id, Resolution::Evaluate, observer, &mut result);
    result
}
