//! Trigger checking: does a bar fill or trigger a simple order?
//!
//! Market, limit and stop rules. All prices come straight from the bar or
//! the order; nothing here looks at intra-bar ordering beyond the open.

use crate::domain::{Bar, OrderSide};
use rust_decimal::Decimal;

/// Result of checking a single price rule against a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    /// Bar never reached the price.
    NoTrigger,
    /// Reached, filling at `fill_price`.
    Fill { fill_price: Decimal },
}

impl TriggerResult {
    pub fn fill_price(self) -> Option<Decimal> {
        match self {
            TriggerResult::NoTrigger => None,
            TriggerResult::Fill { fill_price } => Some(fill_price),
        }
    }
}

/// Market orders fill at the open, unconditionally.
pub fn check_market(bar: &Bar) -> TriggerResult {
    TriggerResult::Fill { fill_price: bar.open }
}

/// Buy limit: fills if low <= limit, at the better of open and limit.
/// Sell limit: fills if high >= limit, at the better of open and limit.
pub fn check_limit(side: OrderSide, limit: Decimal, bar: &Bar) -> TriggerResult {
    match side {
        OrderSide::Buy => {
            if bar.low <= limit {
                TriggerResult::Fill { fill_price: bar.open.min(limit) }
            } else {
                TriggerResult::NoTrigger
            }
        }
        OrderSide::Sell => {
            if bar.high >= limit {
                TriggerResult::Fill { fill_price: bar.open.max(limit) }
            } else {
                TriggerResult::NoTrigger
            }
        }
    }
}

/// Whether the bar's range reached a stop level on the triggering side.
pub fn stop_reached(side: OrderSide, stop: Decimal, bar: &Bar) -> bool {
    match side {
        OrderSide::Buy => bar.high >= stop,
        OrderSide::Sell => bar.low <= stop,
    }
}

/// Stop order trigger.
///
/// Buy stop triggers if high >= stop and fills at the stop when the bar
/// traded through it, at the open when the whole bar gapped above.
/// Sell stop mirrors this below the market.
pub fn check_stop(side: OrderSide, stop: Decimal, bar: &Bar) -> TriggerResult {
    if !stop_reached(side, stop, bar) {
        return TriggerResult::NoTrigger;
    }
    let gapped = match side {
        OrderSide::Buy => bar.low > stop,
        OrderSide::Sell => bar.high < stop,
    };
    TriggerResult::Fill { fill_price: if gapped { bar.open } else { stop } }
}
