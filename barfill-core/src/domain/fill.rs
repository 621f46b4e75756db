use crate::domain::ids::OrderId;
use crate::domain::order::{OrderKindTag, OrderSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fill record
///
/// Trigger kinds (stop, stop-limit, trailing) record their activation as a
/// fill at the gap-adjusted trigger price; the spawned child records the
/// actual execution with `parent_id` pointing back at the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    /// `None` for root orders.
    pub parent_id: Option<OrderId>,
    pub order_kind: OrderKindTag,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Fill {
    pub fn is_trigger(&self) -> bool {
        self.order_kind.is_trigger()
    }
}
