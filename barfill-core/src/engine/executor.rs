//! Recursive evaluation of an order tree against one bar.
//!
//! Each node is reduced to a [`Decision`]: either it stays pending, or it
//! fills at a price and may spawn one child (the market or limit order a
//! trigger kind turns into). Filled nodes then recurse into the spawned child
//! and the declared children, in that order, with the node as their parent.

use super::observer::ExecutionObserver;
use super::stop_limit::{evaluate_stop_limit, limit_after_trigger, StopLimitPhase};
use super::trailing::{self, TrailingStep};
use super::trigger::{check_limit, check_market, check_stop, TriggerResult};
use crate::domain::{
    Bar, ExecutionResult, Fill, Order, OrderId, OrderKind, OrderSide, PendingOrder, Trail,
    TrailingState,
};
use rust_decimal::Decimal;

/// How a node is priced on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Apply the node's own kind rule.
    Evaluate,
    /// Already resolved by the parent's trigger; record a fill at this price.
    FillAt(Decimal),
}

/// Child created at trigger time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spawned {
    pub order: Order,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Not filled; the order to resubmit, trailing state possibly updated.
    Pending(Order),
    Filled {
        price: Decimal,
        spawned: Option<Spawned>,
    },
}

/// Ordinal of the single child a trigger kind spawns.
const SPAWNED_ORDINAL: usize = 1;

fn spawn(parent: &Order, kind: OrderKind, resolution: Resolution) -> Option<Spawned> {
    Some(Spawned {
        order: Order::new(
            parent.id.child(SPAWNED_ORDINAL),
            parent.side,
            parent.quantity,
            kind,
        ),
        resolution,
    })
}

fn from_trigger(order: &Order, result: TriggerResult) -> Decision {
    match result {
        TriggerResult::Fill { fill_price } => Decision::Filled {
            price: fill_price,
            spawned: None,
        },
        TriggerResult::NoTrigger => Decision::Pending(order.clone()),
    }
}

/// Apply the kind rule of a single node, without touching its children.
pub(crate) fn decide(order: &Order, bar: &Bar) -> Decision {
    match &order.kind {
        OrderKind::Market => from_trigger(order, check_market(bar)),

        OrderKind::Limit { limit_price } => {
            from_trigger(order, check_limit(order.side, *limit_price, bar))
        }

        OrderKind::Stop { stop_price } => match check_stop(order.side, *stop_price, bar) {
            TriggerResult::Fill { fill_price } => Decision::Filled {
                price: fill_price,
                spawned: spawn(order, OrderKind::Market, Resolution::FillAt(fill_price)),
            },
            TriggerResult::NoTrigger => Decision::Pending(order.clone()),
        },

        OrderKind::StopLimit {
            stop_price,
            limit_price,
        } => limit_leg(
            order,
            evaluate_stop_limit(order.side, *stop_price, *limit_price, bar),
            *limit_price,
        ),

        OrderKind::TrailingStopMarket { trail, state } => {
            match trail_step(order, *trail, *state, bar) {
                Trailed::Triggered(trigger_price) => {
                    let price = check_stop(order.side, trigger_price, bar)
                        .fill_price()
                        .unwrap_or(trigger_price);
                    Decision::Filled {
                        price,
                        spawned: spawn(order, OrderKind::Market, Resolution::FillAt(price)),
                    }
                }
                Trailed::Holding(pending) => Decision::Pending(pending),
            }
        }

        OrderKind::TrailingStopLimit {
            trail,
            limit_offset,
            state,
        } => match trail_step(order, *trail, *state, bar) {
            Trailed::Triggered(trigger_price) => {
                let trigger_point = check_stop(order.side, trigger_price, bar)
                    .fill_price()
                    .unwrap_or(trigger_price);
                let limit_price = match order.side {
                    OrderSide::Buy => trigger_price - *limit_offset,
                    OrderSide::Sell => trigger_price + *limit_offset,
                };
                limit_leg(
                    order,
                    limit_after_trigger(order.side, trigger_point, limit_price, bar),
                    limit_price,
                )
            }
            Trailed::Holding(pending) => Decision::Pending(pending),
        },
    }
}

/// Trigger fill plus the Limit child a stop-limit style order turns into.
fn limit_leg(order: &Order, phase: StopLimitPhase, limit_price: Decimal) -> Decision {
    match phase {
        StopLimitPhase::Pending => Decision::Pending(order.clone()),
        StopLimitPhase::FilledAtLimit { trigger_point, price } => Decision::Filled {
            price: trigger_point,
            spawned: spawn(
                order,
                OrderKind::Limit { limit_price: price },
                Resolution::FillAt(price),
            ),
        },
        StopLimitPhase::FilledAtTrigger { trigger_point } => Decision::Filled {
            price: trigger_point,
            spawned: spawn(
                order,
                OrderKind::Limit {
                    limit_price: trigger_point,
                },
                Resolution::FillAt(trigger_point),
            ),
        },
        // Triggered, but the limit leg waits for a later bar.
        StopLimitPhase::NoFill { trigger_point } => Decision::Filled {
            price: trigger_point,
            spawned: spawn(order, OrderKind::Limit { limit_price }, Resolution::Evaluate),
        },
    }
}

enum Trailed {
    Triggered(Decimal),
    /// Pending copy carrying the initialised or updated state.
    Holding(Order),
}

fn trail_step(order: &Order, trail: Trail, state: Option<TrailingState>, bar: &Bar) -> Trailed {
    match state {
        None => Trailed::Holding(
            order
                .clone()
                .with_trailing_state(trailing::initialize(order.side, trail, bar)),
        ),
        Some(state) => match trailing::step(order.side, trail, state, bar) {
            TrailingStep::Triggered { trigger_price, .. } => Trailed::Triggered(trigger_price),
            TrailingStep::Holding(next) => Trailed::Holding(order.clone().with_trailing_state(next)),
        },
    }
}

/// Evaluate `order` and its subtree, appending to `out` in parent-first order.
pub(crate) fn evaluate(
    order: &Order,
    bar: &Bar,
    parent_id: Option<&OrderId>,
    resolution: Resolution,
    observer: &mut dyn ExecutionObserver,
    out: &mut ExecutionResult,
) {
    let decision = match resolution {
        Resolution::Evaluate => decide(order, bar),
        Resolution::FillAt(price) => Decision::Filled {
            price,
            spawned: None,
        },
    };

    match decision {
        Decision::Pending(pending) => {
            observer.on_pending(&pending, bar);
            out.pending.push(PendingOrder {
                order: pending,
                parent_id: parent_id.cloned(),
            });
        }
        Decision::Filled { price, spawned } => {
            if order.kind_tag().is_trigger() {
                observer.on_trigger(order, price, bar);
            }
            let fill = Fill {
                order_id: order.id.clone(),
                parent_id: parent_id.cloned(),
                order_kind: order.kind_tag(),
                side: order.side,
                price,
                quantity: order.quantity,
                timestamp: bar.timestamp,
            };
            observer.on_fill(&fill);
            out.fills.push(fill);

            if let Some(child) = spawned {
                evaluate(&child.order, bar, Some(&order.id), child.resolution, observer, out);
            }
            for child in &order.children {
                evaluate(child, bar, Some(&order.id), Resolution::Evaluate, observer, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderKindTag;
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

    #[test]
    fn stop_spawns_market_child_at_gap_adjusted_price() {
        let order = Order::stop("7", OrderSide::Buy, dec!(100), dec!(151));
        let decision = decide(&order, &bullish());
        assert_eq!(
            decision,
            Decision::Filled {
                price: dec!(151),
                spawned: Some(Spawned {
                    order: Order::market("7.1", OrderSide::Buy, dec!(100)),
                    resolution: Resolution::FillAt(dec!(151)),
                }),
            }
        );
    }

    #[test]
    fn stop_limit_no_fill_spawns_evaluated_limit_child() {
        let order = Order::stop_limit("3", OrderSide::Buy, dec!(100), dec!(147), dec!(145));
        let Decision::Filled { price, spawned } = decide(&order, &bullish()) else {
            panic!("stop should trigger");
        };
        assert_eq!(price, dec!(148));
        let spawned = spawned.unwrap();
        assert_eq!(spawned.order.kind, OrderKind::Limit { limit_price: dec!(145) });
        assert_eq!(spawned.resolution, Resolution::Evaluate);
    }

    #[test]
    fn trailing_first_bar_only_initializes() {
        let order = Order::trailing_stop_market("1", OrderSide::Buy, dec!(10), Trail::Amount(dec!(5)));
        let Decision::Pending(pending) = decide(&order, &bullish()) else {
            panic!("first bar must not trigger");
        };
        assert_eq!(
            pending.kind.trailing_state(),
            Some(TrailingState {
                current_stop: dec!(153),
                extreme: dec!(148)
            })
        );
        // Caller's order is untouched.
        assert_eq!(order.kind.trailing_state(), None);
    }

    #[test]
    fn trailing_limit_child_offsets_from_trigger() {
        let order = Order::trailing_stop_limit(
            "1",
            OrderSide::Sell,
            dec!(10),
            Trail::Amount(dec!(3)),
            dec!(0.5),
        )
        .with_trailing_state(TrailingState {
            current_stop: dec!(147),
            extreme: dec!(150),
        });
        let Decision::Filled { price, spawned } = decide(&order, &bullish()) else {
            panic!("low 146 crosses 147");
        };
        assert_eq!(price, dec!(149));
        let child = spawned.unwrap();
        assert_eq!(child.order.kind_tag(), OrderKindTag::Limit);
        assert_eq!(child.order.kind, OrderKind::Limit { limit_price: dec!(149.5) });
        // high 152 reaches 149.5 after the trigger
        assert_eq!(child.resolution, Resolution::FillAt(dec!(149.5)));
    }
}
