//! Validation gateway.
//!
//! The engine assumes well-formed input. Everything that enters a replay
//! from outside (config files, CSV bars) passes through here first.

use barfill_core::domain::{Bar, BarError, Order, OrderError, OrderId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bar {index} ({timestamp}): {source}")]
    Bar {
        index: usize,
        timestamp: DateTime<Utc>,
        #[source]
        source: BarError,
    },

    #[error("bar {index} at {timestamp} is not after the previous bar at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("duplicate order id '{0}'")]
    DuplicateOrderId(OrderId),

    #[error("order id '{0}' uses '.', which is reserved for spawned children")]
    ReservedOrderId(OrderId),
}

pub fn validate_bar(index: usize, bar: &Bar) -> Result<(), ValidationError> {
    bar.validate().map_err(|source| ValidationError::Bar {
        index,
        timestamp: bar.timestamp,
        source,
    })
}

/// Each bar must be sane and strictly later than the one before it.
pub fn validate_bars(bars: &[Bar]) -> Result<(), ValidationError> {
    for (index, bar) in bars.iter().enumerate() {
        validate_bar(index, bar)?;
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(ValidationError::OutOfOrder {
                    index,
                    timestamp: bar.timestamp,
                    previous,
                });
            }
        }
    }
    Ok(())
}

/// Parameter checks for one order tree.
pub fn validate_order(order: &Order) -> Result<(), ValidationError> {
    order.validate()?;
    Ok(())
}

/// Validate every order tree and make sure ids are unique across all of them.
///
/// Spawned children take `"<parent>.<n>"` ids, so user ids may not contain a dot.
pub fn validate_orders(orders: &[Order]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    let mut stack: Vec<&Order> = orders.iter().collect();
    while let Some(order) = stack.pop() {
        if order.id.as_str().contains('.') {
            return Err(ValidationError::ReservedOrderId(order.id.clone()));
        }
        if !seen.insert(&order.id) {
            return Err(ValidationError::DuplicateOrderId(order.id.clone()));
        }
        stack.extend(order.children.iter());
    }
    orders.iter().try_for_each(validate_order)
}
