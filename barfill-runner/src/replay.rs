//! Bar-by-bar replay loop.
//!
//! Owns the working set of orders. Each bar, every working order goes through
//! the engine once; fills are collected and whatever comes back pending
//! (with its parent linkage and updated trailing state) becomes the working
//! set for the next bar.

use barfill_core::domain::{Bar, Fill, Order, OrderId, PendingOrder};
use barfill_core::engine::ExecutionObserver;
use barfill_core::execute_observed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of replaying a set of orders over a bar series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Every fill, bar by bar, parent-first within a bar.
    pub fills: Vec<Fill>,
    /// Orders still working after the last bar.
    pub pending: Vec<PendingOrder>,
    pub bars_processed: usize,
}

impl ReplayResult {
    /// Fills descending from `root`, including `root`'s own fill.
    pub fn chain(&self, root: &OrderId) -> Vec<&Fill> {
        let mut members: HashSet<&OrderId> = HashSet::new();
        let mut chain = Vec::new();
        for fill in &self.fills {
            let linked = fill
                .parent_id
                .as_ref()
                .is_some_and(|parent| members.contains(parent));
            if &fill.order_id == root || linked {
                members.insert(&fill.order_id);
                chain.push(fill);
            }
        }
        chain
    }

    pub fn fills_for<'a>(&'a self, id: &'a OrderId) -> impl Iterator<Item = &'a Fill> + 'a {
        self.fills.iter().filter(move |f| &f.order_id == id)
    }
}

/// Replay `orders` over `bars` in order. Stops early once nothing is working.
pub fn run_replay(
    bars: &[Bar],
    orders: Vec<Order>,
    observer: &mut dyn ExecutionObserver,
) -> ReplayResult {
    let mut working: Vec<PendingOrder> = orders
        .into_iter()
        .map(|order| PendingOrder {
            order,
            parent_id: None,
        })
        .collect();
    let mut result = ReplayResult::default();

    for bar in bars {
        if working.is_empty() {
            break;
        }
        let mut next = Vec::with_capacity(working.len());
        let mut bar_fills = 0usize;
        for item in &working {
            let outcome = execute_observed(&item.order, bar, item.parent_id.as_ref(), observer);
            bar_fills += outcome.fills.len();
            result.fills.extend(outcome.fills);
            next.extend(outcome.pending);
        }
        tracing::debug!(
            bar_ts = %bar.timestamp,
            fills = bar_fills,
            working = next.len(),
            "bar processed"
        );
        working = next;
        result.bars_processed += 1;
    }

    result.pending = working;
    tracing::info!(
        bars = result.bars_processed,
        fills = result.fills.len(),
        pending = result.pending.len(),
        "replay finished"
    );
    result
}
