//! Read models fed from the market event bus.

pub mod trade_history;

pub use trade_history::{TradeHistoryError, TradeHistoryProjection, TradeRecord};
