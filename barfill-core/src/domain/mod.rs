//! Domain types for barfill

pub mod bar;
pub mod fill;
pub mod ids;
pub mod order;
pub mod result;

pub use bar::{Bar, BarError};
pub use fill::Fill;
pub use ids::OrderId;
pub use order::{Order, OrderError, OrderKind, OrderKindTag, OrderSide, Trail, TrailingState};
pub use result::{ExecutionResult, ExecutionStatus, PendingOrder, ResultError};
