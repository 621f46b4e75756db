//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Fill prices stay within the bar (or at the open)
//! 2. Evaluation is deterministic
//! 3. Stop-limit limit fills only happen inside the bar range
//! 4. Trailing stops only tighten and trigger at the conservative level
//! 5. Parent fills always precede their children

use barfill_core::domain::{Bar, Order, OrderSide, Trail, TrailingState};
use barfill_core::engine::stop_limit::{evaluate_stop_limit, StopLimitPhase};
use barfill_core::engine::trailing::{step, TrailingStep};
use barfill_core::execute;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ── Strategies (proptest) ────────────────────────────────────────────

fn cents(v: i64) -> Decimal {
    Decimal::new(v, 2)
}

/// Well-formed bar with prices between 10.00 and ~520.00.
fn arb_bar() -> impl Strategy<Value = Bar> {
    (1_000i64..50_000, 0i64..2_000, 0u32..=100, 0u32..=100).prop_map(|(low, range, o, c)| {
        let high = low + range;
        let open = low + range * i64::from(o) / 100;
        let close = low + range * i64::from(c) / 100;
        Bar::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap(),
            cents(open),
            cents(high),
            cents(low),
            cents(close),
            1_000,
        )
    })
}

fn arb_side() -> impl Strategy<Value = OrderSide> {
    prop_oneof![Just(OrderSide::Buy), Just(OrderSide::Sell)]
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (500i64..55_000).prop_map(cents)
}

fn arb_simple_order() -> impl Strategy<Value = Order> {
    (arb_side(), arb_price(), 0u8..3).prop_map(|(side, price, kind)| match kind {
        0 => Order::market("1", side, Decimal::ONE_HUNDRED),
        1 => Order::limit("1", side, Decimal::ONE_HUNDRED, price),
        _ => Order::stop("1", side, Decimal::ONE_HUNDRED, price),
    })
}

fn in_range_or_open(price: Decimal, bar: &Bar) -> bool {
    (bar.low <= price && price <= bar.high) || price == bar.open
}

// ── 1. Fill prices in range ──────────────────────────────────────────

proptest! {
    #[test]
    fn simple_fills_stay_in_bar(order in arb_simple_order(), bar in arb_bar()) {
        let result = execute(&order, &bar, None);
        for fill in &result.fills {
            prop_assert!(in_range_or_open(fill.price, &bar), "{} outside {:?}", fill.price, bar);
        }
    }

    #[test]
    fn stop_limit_fills_stay_in_bar(
        side in arb_side(),
        stop in arb_price(),
        limit in arb_price(),
        bar in arb_bar(),
    ) {
        let order = Order::stop_limit("1", side, Decimal::ONE_HUNDRED, stop, limit);
        let result = execute(&order, &bar, None);
        for fill in &result.fills {
            prop_assert!(in_range_or_open(fill.price, &bar));
        }
    }
}

// ── 2. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn same_inputs_same_result(
        side in arb_side(),
        stop in arb_price(),
        limit in arb_price(),
        bar in arb_bar(),
    ) {
        let order = Order::stop_limit("9", side, Decimal::ONE_HUNDRED, stop, limit);
        prop_assert_eq!(execute(&order, &bar, None), execute(&order, &bar, None));
    }
}

// ── 3. Stop-limit phase 2 ────────────────────────────────────────────

proptest! {
    #[test]
    fn limit_fill_only_inside_range(
        side in arb_side(),
        stop in arb_price(),
        limit in arb_price(),
        bar in arb_bar(),
    ) {
        match evaluate_stop_limit(side, stop, limit, &bar) {
            StopLimitPhase::FilledAtLimit { price, .. } => {
                prop_assert!(bar.low <= price && price <= bar.high);
            }
            StopLimitPhase::NoFill { .. } => match side {
                OrderSide::Buy => prop_assert!(limit < bar.low),
                OrderSide::Sell => prop_assert!(limit > bar.high),
            },
            StopLimitPhase::Pending | StopLimitPhase::FilledAtTrigger { .. } => {}
        }
    }
}

// ── 4. Trailing ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn trailing_stop_only_tightens(
        side in arb_side(),
        trail in 1i64..1_000,
        bar in arb_bar(),
    ) {
        let trail = Trail::Amount(cents(trail));
        let extreme = bar.open;
        let state = TrailingState {
            current_stop: match side {
                OrderSide::Buy => extreme + trail.distance(extreme),
                OrderSide::Sell => extreme - trail.distance(extreme),
            },
            extreme,
        };
        let next = match step(side, trail, state, &bar) {
            TrailingStep::Holding(next) => next,
            TrailingStep::Triggered { state, .. } => state,
        };
        match side {
            OrderSide::Buy => prop_assert!(next.current_stop <= state.current_stop),
            OrderSide::Sell => prop_assert!(next.current_stop >= state.current_stop),
        }
    }

    #[test]
    fn dual_trigger_uses_conservative_level(
        side in arb_side(),
        trail in 1i64..1_000,
        bar in arb_bar(),
    ) {
        let trail = Trail::Amount(cents(trail));
        let state = TrailingState {
            current_stop: match side {
                OrderSide::Buy => bar.open + trail.distance(bar.open),
                OrderSide::Sell => bar.open - trail.distance(bar.open),
            },
            extreme: bar.open,
        };
        if let TrailingStep::Triggered { trigger_price, state: next } = step(side, trail, state, &bar) {
            match side {
                OrderSide::Buy => {
                    prop_assert_eq!(trigger_price, state.current_stop.min(next.current_stop));
                    prop_assert!(bar.high >= trigger_price);
                }
                OrderSide::Sell => {
                    prop_assert_eq!(trigger_price, state.current_stop.max(next.current_stop));
                    prop_assert!(bar.low <= trigger_price);
                }
            }
        }
    }
}

// ── 5. Ordering ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn parent_fill_precedes_children(
        side in arb_side(),
        stop in arb_price(),
        bar in arb_bar(),
    ) {
        let order = Order::stop("1", side, Decimal::ONE_HUNDRED, stop)
            .with_child(Order::market("2", side, Decimal::ONE));
        let result = execute(&order, &bar, None);
        if let Some(first) = result.fills.first() {
            prop_assert_eq!(first.order_id.as_str(), "1");
            prop_assert!(first.parent_id.is_none());
            for child in &result.fills[1..] {
                prop_assert_eq!(child.parent_id.as_ref().map(|p| p.as_str()), Some("1"));
            }
        } else {
            prop_assert_eq!(result.pending.len(), 1);
        }
    }
}
