//! lob-core
//!
//! Pure matching-engine logic for a single traded instrument:
//! - order and trade value types
//! - price-time priority order book
//! - matcher (best-first walk of the opposite side)
//! - engine facade (validation, id assignment, trade log, snapshots)
//!
//! The engine is a synchronous, single-threaded state machine. It performs
//! no I/O and never reads a clock; timestamps are supplied by the caller.

pub mod side;
pub mod order_type;
pub mod order;
pub mod trade;
pub mod price_key;
pub mod node;
pub mod price_level;
pub mod order_book;
pub mod matcher;
pub mod trades;
pub mod snapshot;
pub mod engine;
pub mod error;

pub use side::Side;
pub use order_type::OrderType;

pub use order::{Order, OrderStatus};
pub use trade::Trade;

pub use order_book::OrderBook;
pub use snapshot::{BookSnapshot, TopOfBookSnapshot};

pub use engine::{EngineConfig, MatchingEngine};
pub use error::EngineError;
