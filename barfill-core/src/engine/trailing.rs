//! Trailing stop state transitions
//!
//! **Core Rule:** the stop only tightens. A buy trailing stop sits above the
//! market and follows the lowest low down; a sell trailing stop sits below the
//! market and follows the highest high up.
//!
//! State is consumed and re-produced per bar. Nothing here mutates the order;
//! the executor puts the returned state on the pending copy.

use crate::domain::{Bar, OrderSide, Trail, TrailingState};
use rust_decimal::Decimal;

/// Outcome of one bar for an initialised trailing stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingStep {
    /// Stop not crossed; carry `state` into the next bar.
    Holding(TrailingState),
    /// Stop crossed at `trigger_price`, the more conservative of the
    /// pre-update and post-update stop levels.
    Triggered {
        trigger_price: Decimal,
        state: TrailingState,
    },
}

fn stop_from(side: OrderSide, trail: Trail, extreme: Decimal) -> Decimal {
    match side {
        OrderSide::Buy => extreme + trail.distance(extreme),
        OrderSide::Sell => extreme - trail.distance(extreme),
    }
}

/// First evaluation: anchor the extreme at the bar's open.
pub fn initialize(side: OrderSide, trail: Trail, bar: &Bar) -> TrailingState {
    TrailingState {
        current_stop: stop_from(side, trail, bar.open),
        extreme: bar.open,
    }
}

/// Advance an initialised trailing stop by one bar.
///
/// The extreme is updated first, then both the old and the new stop are
/// tested against the bar. Either crossing triggers, at the level a
/// conservative fill would reach first.
///
/// # Example
/// ```
/// use barfill_core::domain::{OrderSide, Trail, TrailingState, Bar};
/// use barfill_core::engine::trailing::{step, TrailingStep};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let state = TrailingState { current_stop: Decimal::from(105), extreme: Decimal::from(100) };
/// let bar = Bar::new(Utc::now(), Decimal::from(102), Decimal::from(108), Decimal::from(101), Decimal::from(107), 0);
///
/// match step(OrderSide::Buy, Trail::Amount(Decimal::from(5)), state, &bar) {
///     TrailingStep::Triggered { trigger_price, .. } => assert_eq!(trigger_price, Decimal::from(105)),
///     TrailingStep::Holding(_) => unreachable!(),
/// }
/// ```
pub fn step(side: OrderSide, trail: Trail, state: TrailingState, bar: &Bar) -> TrailingStep {
    let old_stop = state.current_stop;
    let improved = match side {
        OrderSide::Buy => bar.low < state.extreme,
        OrderSide::Sell => bar.high > state.extreme,
    };
    let next = if improved {
        let extreme = match side {
            OrderSide::Buy => bar.low,
            OrderSide::Sell => bar.high,
        };
        TrailingState {
            current_stop: stop_from(side, trail, extreme),
            extreme,
        }
    } else {
        state
    };
    let new_stop = next.current_stop;

    let (crossed, trigger_price) = match side {
        OrderSide::Buy => (
            bar.high >= old_stop || bar.high >= new_stop,
            old_stop.min(new_stop),
        ),
        OrderSide::Sell => (
            bar.low <= old_stop || bar.low <= new_stop,
            old_stop.max(new_stop),
        ),
    };

    if crossed {
        TrailingStep::Triggered {
            trigger_price,
            state: next,
        }
    } else {
        TrailingStep::Holding(next)
    }
}
