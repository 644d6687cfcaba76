//! Executed trade record.

use serde::{Deserialize, Serialize};

/// An execution between a buy order and a sell order.
///
/// Immutable once appended to the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Engine-assigned id, monotonic from 1, independent of order ids.
    pub id: u64,
    pub buy_order_id: u64,
    pub sell_order_id: u64,

    /// Execution price: always the resting (maker) order's limit price.
    pub price: f64,
    pub quantity: f64,

    /// Timestamp of the aggressor order that produced this trade.
    pub timestamp: u64,
}
