//! Order type (Market vs Limit).
//!
//! Limit orders carry a price and may rest in the book; market orders
//! never rest. Any unfilled market remainder is discarded.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}
