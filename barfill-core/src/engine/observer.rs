//! Execution observer: optional hook for trigger, fill and pending events.
//!
//! The engine itself never logs. Callers that want visibility pass a
//! [`TracingObserver`], or their own implementation, to `execute_observed`.

use crate::domain::{Bar, Fill, Order, OrderId};
use rust_decimal::Decimal;

/// Receives engine events in emission order. Every method defaults to a no-op.
pub trait ExecutionObserver {
    /// A trigger kind activated at `trigger_price`.
    fn on_trigger(&mut self, _order: &Order, _trigger_price: Decimal, _bar: &Bar) {}

    /// A fill was appended to the result.
    fn on_fill(&mut self, _fill: &Fill) {}

    /// An order was returned pending, carrying any updated trailing state.
    fn on_pending(&mut self, _order: &Order, _bar: &Bar) {}
}

impl<O: ExecutionObserver + ?Sized> ExecutionObserver for &mut O {
    fn on_trigger(&mut self, order: &Order, trigger_price: Decimal, bar: &Bar) {
        (**self).on_trigger(order, trigger_price, bar)
    }

    fn on_fill(&mut self, fill: &Fill) {
        (**self).on_fill(fill)
    }

    fn on_pending(&mut self, order: &Order, bar: &Bar) {
        (**self).on_pending(order, bar)
    }
}

/// Default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExecutionObserver for NoopObserver {}

/// Forwards engine events to `tracing`: triggers and fills at debug, pending at trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExecutionObserver for TracingObserver {
    fn on_trigger(&mut self, order: &Order, trigger_price: Decimal, bar: &Bar) {
        tracing::debug!(
            order_id = %order.id,
            kind = ?order.kind_tag(),
            side = ?order.side,
            %trigger_price,
            bar_ts = %bar.timestamp,
            "order triggered"
        );
    }

    fn on_fill(&mut self, fill: &Fill) {
        tracing::debug!(
            order_id = %fill.order_id,
            parent_id = fill.parent_id.as_ref().map(OrderId::as_str),
            kind = ?fill.order_kind,
            side = ?fill.side,
            price = %fill.price,
            quantity = %fill.quantity,
            "fill"
        );
    }

    fn on_pending(&mut self, order: &Order, bar: &Bar) {
        tracing::trace!(
            order_id = %order.id,
            kind = ?order.kind_tag(),
            trailing = ?order.kind.trailing_state(),
            bar_ts = %bar.timestamp,
            "order pending"
        );
    }
}

/// One recorded engine event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEvent {
    Trigger { order_id: OrderId, trigger_price: Decimal },
    Fill(Fill),
    Pending { order_id: OrderId },
}

/// Keeps every event in order. Handy in tests and replay diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<ObservedEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ObservedEvent::Trigger { .. }))
            .count()
    }
}

impl ExecutionObserver for RecordingObserver {
    fn on_trigger(&mut self, order: &Order, trigger_price: Decimal, _bar: &Bar) {
        self.events.push(ObservedEvent::Trigger {
            order_id: order.id.clone(),
            trigger_price,
        });
    }

    fn on_fill(&mut self, fill: &Fill) {
        self.events.push(ObservedEvent::Fill(fill.clone()));
    }

    fn on_pending(&mut self, order: &Order, _bar: &Bar) {
        self.events.push(ObservedEvent::Pending {
            order_id: order.id.clone(),
        });
    }
}
