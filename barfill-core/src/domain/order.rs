//! Order kinds, trailing state, and order construction.

use super::ids::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameter violations reported by [`Order::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order {id}: quantity must be > 0 (got {quantity})")]
    NonPositiveQuantity { id: OrderId, quantity: Decimal },

    #[error("order {id}: trail must be > 0 (got {trail})")]
    NonPositiveTrail { id: OrderId, trail: Decimal },

    #[error("order {id}: limit offset must be >= 0 (got {offset})")]
    NegativeLimitOffset { id: OrderId, offset: Decimal },
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Trailing distance: fixed amount or percentage of the tracked extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trail {
    Amount(Decimal),
    Percent(Decimal),
}

impl Trail {
    /// Absolute distance from `extreme` to the stop.
    pub fn distance(self, extreme: Decimal) -> Decimal {
        match self {
            Trail::Amount(amount) => amount,
            Trail::Percent(percent) => extreme * percent / Decimal::ONE_HUNDRED,
        }
    }

    fn raw(self) -> Decimal {
        match self {
            Trail::Amount(v) | Trail::Percent(v) => v,
        }
    }
}

/// Carried state of a trailing stop between bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingState {
    pub current_stop: Decimal,
    /// Lowest low (BUY) or highest high (SELL) seen since initialisation.
    pub extreme: Decimal,
}

/// What kind of order and its price parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Fill at the bar's open.
    Market,
    /// Fill at limit price or better.
    Limit { limit_price: Decimal },
    /// Triggers at stop_price, then becomes a market order.
    Stop { stop_price: Decimal },
    /// Triggers at stop_price, then becomes a limit order at limit_price.
    StopLimit {
        stop_price: Decimal,
        limit_price: Decimal,
    },
    /// Stop that follows the market by `trail`, then becomes a market order.
    TrailingStopMarket {
        trail: Trail,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<TrailingState>,
    },
    /// Stop that follows the market by `trail`, then becomes a limit order
    /// `limit_offset` away from the trigger.
    TrailingStopLimit {
        trail: Trail,
        limit_offset: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<TrailingState>,
    },
}

/// Data-free discriminant of [`OrderKind`], carried on fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKindTag {
    Market,
    Limit,
    Stop,
    StopLimit,
    TrailingStopMarket,
    TrailingStopLimit,
}

impl OrderKindTag {
    /// Kinds whose fill records an activation rather than an execution.
    pub fn is_trigger(self) -> bool {
        !matches!(self, OrderKindTag::Market | OrderKindTag::Limit)
    }
}

impl OrderKind {
    pub fn tag(&self) -> OrderKindTag {
        match self {
            OrderKind::Market => OrderKindTag::Market,
            OrderKind::Limit { .. } => OrderKindTag::Limit,
            OrderKind::Stop { .. } => OrderKindTag::Stop,
            OrderKind::StopLimit { .. } => OrderKindTag::StopLimit,
            OrderKind::TrailingStopMarket { .. } => OrderKindTag::TrailingStopMarket,
            OrderKind::TrailingStopLimit { .. } => OrderKindTag::TrailingStopLimit,
        }
    }

    /// Carried trailing state, `None` for non-trailing kinds or before the
    /// first evaluation.
    pub fn trailing_state(&self) -> Option<TrailingState> {
        match self {
            OrderKind::TrailingStopMarket { state, .. }
            | OrderKind::TrailingStopLimit { state, .. } => *state,
            _ => None,
        }
    }
}

/// A single order and the children it owns.
///
/// Declared children are evaluated on the same bar once this order fills.
/// Children spawned at trigger time are not stored here; the engine creates
/// them during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub kind: OrderKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Order>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, side: OrderSide, quantity: Decimal, kind: OrderKind) -> Self {
        Self {
            id: id.into(),
            side,
            quantity,
            kind,
            children: Vec::new(),
        }
    }

    pub fn market(id: impl Into<OrderId>, side: OrderSide, quantity: Decimal) -> Self {
        Self::new(id, side, quantity, OrderKind::Market)
    }

    pub fn limit(
        id: impl Into<OrderId>,
        side: OrderSide,
        quantity: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self::new(id, side, quantity, OrderKind::Limit { limit_price })
    }

    pub fn stop(
        id: impl Into<OrderId>,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self::new(id, side, quantity, OrderKind::Stop { stop_price })
    }

    pub fn stop_limit(
        id: impl Into<OrderId>,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> Self {
        Self::new(
            id,
            side,
            quantity,
            OrderKind::StopLimit {
                stop_price,
                limit_price,
            },
        )
    }

    pub fn trailing_stop_market(
        id: impl Into<OrderId>,
        side: OrderSide,
        quantity: Decimal,
        trail: Trail,
    ) -> Self {
        Self::new(
            id,
            side,
            quantity,
            OrderKind::TrailingStopMarket { trail, state: None },
        )
    }

    pub fn trailing_stop_limit(
        id: impl Into<OrderId>,
        side: OrderSide,
        quantity: Decimal,
        trail: Trail,
        limit_offset: Decimal,
    ) -> Self {
        Self::new(
            id,
            side,
            quantity,
            OrderKind::TrailingStopLimit {
                trail,
                limit_offset,
                state: None,
            },
        )
    }

    /// Attach a declared child, evaluated after this order fills.
    pub fn with_child(mut self, child: Order) -> Self {
        self.children.push(child);
        self
    }

    /// Same order with its trailing state replaced. No-op for other kinds.
    pub fn with_trailing_state(mut self, new_state: TrailingState) -> Self {
        match &mut self.kind {
            OrderKind::TrailingStopMarket { state, .. }
            | OrderKind::TrailingStopLimit { state, .. } => *state = Some(new_state),
            _ => {}
        }
        self
    }

    pub fn kind_tag(&self) -> OrderKindTag {
        self.kind.tag()
    }

    /// Check quantity and kind parameters for this order and every declared child.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::NonPositiveQuantity {
                id: self.id.clone(),
                quantity: self.quantity,
            });
        }
        match &self.kind {
            OrderKind::TrailingStopMarket { trail, .. } => self.check_trail(*trail)?,
            OrderKind::TrailingStopLimit {
                trail,
                limit_offset,
                ..
            } => {
                self.check_trail(*trail)?;
                if *limit_offset < Decimal::ZERO {
                    return Err(OrderError::NegativeLimitOffset {
                        id: self.id.clone(),
                        offset: *limit_offset,
                    });
                }
            }
            _ => {}
        }
        self.children.iter().try_for_each(Order::validate)
    }

    fn check_trail(&self, trail: Trail) -> Result<(), OrderError> {
        if trail.raw() <= Decimal::ZERO {
            return Err(OrderError::NonPositiveTrail {
                id: self.id.clone(),
                trail: trail.raw(),
            });
        }
        Ok(())
    }
}
