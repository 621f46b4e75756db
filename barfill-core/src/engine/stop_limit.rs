//! Two-phase stop-limit evaluation.
//!
//! Phase 1 is the plain stop test. Once triggered, the trigger point is the
//! open if the bar opened beyond the stop, else the stop itself. Phase 2 asks
//! whether the limit is reachable from the trigger point in the rest of the
//! bar: a buy limit below the trigger needs the bar to come back down to it,
//! a buy limit at or above the trigger is marketable straight away.

use super::trigger::stop_reached;
use crate::domain::{Bar, OrderSide};
use rust_decimal::Decimal;

/// Where a stop-limit ends up after one bar. Re-derived from prices each bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopLimitPhase {
    /// Stop not reached; order stays pending unchanged.
    Pending,
    /// Stop reached and the limit was crossed after the trigger.
    FilledAtLimit { trigger_point: Decimal, price: Decimal },
    /// Stop reached and the limit was already marketable at the trigger.
    FilledAtTrigger { trigger_point: Decimal },
    /// Stop reached but the limit lies beyond the bar on the unreachable side.
    NoFill { trigger_point: Decimal },
}

/// Point at which a reached stop activates: the open when the bar opened
/// beyond the stop, the stop otherwise.
pub fn trigger_point(side: OrderSide, stop: Decimal, bar: &Bar) -> Decimal {
    match side {
        OrderSide::Buy => bar.open.max(stop),
        OrderSide::Sell => bar.open.min(stop),
    }
}

pub fn evaluate_stop_limit(side: OrderSide, stop: Decimal, limit: Decimal, bar: &Bar) -> StopLimitPhase {
    if !stop_reached(side, stop, bar) {
        return StopLimitPhase::Pending;
    }
    limit_after_trigger(side, trigger_point(side, stop, bar), limit, bar)
}

/// Phase 2 on its own: price a limit leg that comes alive at `trigger_point`.
///
/// Only price movement after the trigger counts, so the open never improves
/// the limit fill. Shared by stop-limit and trailing stop-limit orders.
pub fn limit_after_trigger(
    side: OrderSide,
    trigger_point: Decimal,
    limit: Decimal,
    bar: &Bar,
) -> StopLimitPhase {
    let (reached_later, marketable) = match side {
        OrderSide::Buy => (bar.low <= limit && limit < trigger_point, limit >= trigger_point),
        OrderSide::Sell => (bar.high >= limit && limit > trigger_point, limit <= trigger_point),
    };
    if reached_later {
        StopLimitPhase::FilledAtLimit {
            trigger_point,
            price: limit,
        }
    } else if marketable {
        StopLimitPhase::FilledAtTrigger { trigger_point }
    } else {
        StopLimitPhase::NoFill { trigger_point }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bullish() -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0).unwrap(),
            dec!(148),
            dec!(152),
            dec!(146),
            dec!(150),
            10_000,
        )
    }

    fn bearish() -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0).unwrap(),
            dec!(150),
            dec!(152),
            dec!(146),
            dec!(148),
            10_000,
        )
    }

    // ── Buy ──────────────────────────────────────────────────────────

    #[test]
    fn buy_triggered_inside_range_fills_at_trigger() {
        let phase = evaluate_stop_limit(OrderSide::Buy, dec!(151), dec!(152), &bullish());
        assert_eq!(
            phase,
            StopLimitPhase::FilledAtTrigger {
                trigger_point: dec!(151)
            }
        );
    }

    #[test]
    fn buy_opened_above_stop_fills_at_limit_on_the_way_down() {
        let phase = evaluate_stop_limit(OrderSide::Buy, dec!(146), dec!(147), &bullish());
        assert_eq!(
            phase,
            StopLimitPhase::FilledAtLimit {
                trigger_point: dec!(148),
                price: dec!(147)
            }
        );
    }

    #[test]
    fn buy_limit_below_low_never_fills() {
        let phase = evaluate_stop_limit(OrderSide::Buy, dec!(147), dec!(145), &bullish());
        assert_eq!(
            phase,
            StopLimitPhase::NoFill {
                trigger_point: dec!(148)
            }
        );
    }

    #[test]
    fn buy_stop_above_high_stays_pending() {
        let phase = evaluate_stop_limit(OrderSide::Buy, dec!(153), dec!(154), &bullish());
        assert_eq!(phase, StopLimitPhase::Pending);
    }

    // ── Sell ─────────────────────────────────────────────────────────

    #[test]
    fn sell_triggered_inside_range_fills_at_trigger() {
        let phase = evaluate_stop_limit(OrderSide::Sell, dec!(147), dec!(146), &bearish());
        assert_eq!(phase, StopLimitPhase::FilledAtTrigger { trigger_point: dec!(147) });
    }

    #[test]
    fn sell_opened_below_stop_fills_at_limit_on_the_way_up() {
        let phase = evaluate_stop_limit(OrderSide::Sell, dec!(151), dec!(151.5), &bearish());
        assert_eq!(
            phase,
            StopLimitPhase::FilledAtLimit {
                trigger_point: dec!(150),
                price: dec!(151.5)
            }
        );
    }

    #[test]
    fn sell_limit_above_high_never_fills() {
        let phase = evaluate_stop_limit(OrderSide::Sell, dec!(149), dec!(153), &bearish());
        assert_eq!(
            phase,
            StopLimitPhase::NoFill {
                trigger_point: dec!(149)
            }
        );
    }

    // ── Limit leg from a given trigger ───────────────────────────────

    #[test]
    fn open_beyond_the_limit_does_not_improve_the_leg() {
        // bar opens at 148, below a buy limit of 149; the leg only exists from 151
        let phase = limit_after_trigger(OrderSide::Buy, dec!(151), dec!(149), &bullish());
        assert_eq!(
            phase,
            StopLimitPhase::FilledAtLimit {
                trigger_point: dec!(151),
                price: dec!(149)
            }
        );
        let phase = limit_after_trigger(OrderSide::Sell, dec!(147), dec!(151), &bearish());
        assert_eq!(
            phase,
            StopLimitPhase::FilledAtLimit {
                trigger_point: dec!(147),
                price: dec!(151)
            }
        );
    }

    #[test]
    fn limit_equal_to_trigger_fills_at_trigger() {
        let phase = limit_after_trigger(OrderSide::Buy, dec!(151), dec!(151), &bullish());
        assert_eq!(phase, StopLimitPhase::FilledAtTrigger { trigger_point: dec!(151) });
    }
}
