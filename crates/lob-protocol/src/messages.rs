//! Transport-agnostic command and event types.
//!
//! These are the logical messages the codecs serialize. The server maps
//! commands onto engine calls and engine results back onto events.

use serde::{Deserialize, Serialize};

use lob_core::{BookSnapshot, Side, TopOfBookSnapshot, Trade};

/// A request into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineCommand {
    /// Limit order: rests at `price` if it does not fully execute.
    SubmitLimit { side: Side, price: f64, quantity: f64 },

    /// Market order: executes against the book, remainder discarded.
    SubmitMarket { side: Side, quantity: f64 },

    /// Cancel a resting order by engine-assigned id.
    Cancel { order_id: u64 },

    /// Ask for the current best bid/ask.
    QueryTopOfBook,

    /// Ask for the full aggregated depth.
    QuerySnapshot,
}

/// An event emitted by the engine task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A submit was accepted and assigned this order id.
    Accepted { order_id: u64 },

    /// A submit failed validation; no id was consumed.
    Rejected { reason: String },

    /// Outcome of a cancel request. `cancelled` is false when the id was
    /// unknown or the order had already departed.
    CancelAck { order_id: u64, cancelled: bool },

    /// An execution. Broadcast to all clients.
    Trade(Trade),

    /// Best bid/ask after a change or on query.
    TopOfBook(TopOfBookSnapshot),

    /// Full aggregated depth, on query.
    Snapshot(BookSnapshot),
}
