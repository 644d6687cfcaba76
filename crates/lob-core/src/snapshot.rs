//! Aggregated read-only views of the book.

use serde::{Deserialize, Serialize};

/// Per-level depth snapshot.
///
/// Each element is `(price, total remaining quantity)`. Bids are
/// best-first descending, asks best-first ascending. An empty side is an
/// empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

impl BookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Best bid and ask, each `(price, total remaining quantity)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopOfBookSnapshot {
    pub bid: Option<(f64, f64)>,
    pub ask: Option<(f64, f64)>,
}

impl TopOfBookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }

    /// Ask minus bid when both sides are present.
    pub fn spread(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some((bid, _)), Some((ask, _))) => Some(ask - bid),
            _ => None,
        }
    }
}
