//! Order representation and lifecycle status.

use serde::{Deserialize, Serialize};

use crate::order_type::OrderType;
use crate::side::Side;

/// Lifecycle status of an order.
///
/// `New` and `PartiallyFilled` are the only states in which an order may
/// rest in the book. `Filled` and `Cancelled` are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    /// True for `Filled` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A single order, resting or in flight.
///
/// Quantities are tracked three ways: `quantity` is the original size,
/// `filled_quantity` accumulates executions, `remaining_quantity` is what
/// is still open. `filled + remaining == quantity` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Engine-assigned id, monotonic from 1, never reused.
    pub id: u64,
    pub side: Side,
    pub order_type: OrderType,

    /// Limit price. `None` for market orders.
    pub price: Option<f64>,

    pub quantity: f64,
    pub filled_quantity: f64,
    pub remaining_quantity: f64,

    pub status: OrderStatus,

    /// Caller-supplied timestamp. Opaque to the engine; used only for
    /// audit and trade records, never for priority (arrival order wins).
    pub timestamp: u64,
}

impl Order {
    pub fn new_limit(id: u64, side: Side, price: f64, quantity: f64, timestamp: u64) -> Self {
        Order {
            id,
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity,
            filled_quantity: 0.0,
            remaining_quantity: quantity,
            status: OrderStatus::New,
            timestamp,
        }
    }

    pub fn new_market(id: u64, side: Side, quantity: f64, timestamp: u64) -> Self {
        Order {
            id,
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
            filled_quantity: 0.0,
            remaining_quantity: quantity,
            status: OrderStatus::New,
            timestamp,
        }
    }

    /// Apply a fill of `quantity` units.
    ///
    /// The caller guarantees `quantity <= remaining_quantity`; the matcher
    /// always fills `min(aggressor.remaining, maker.remaining)`.
    pub fn fill(&mut self, quantity: f64) {
        self.filled_quantity += quantity;
        self.remaining_quantity -= quantity;
    }

    /// Limit price of a resting order.
    ///
    /// Panics for market orders; only limit orders ever rest.
    pub fn limit_price(&self) -> f64 {
        match self.price {
            Some(p) => p,
            None => panic!("market order {} has no limit price", self.id),
        }
    }
}
