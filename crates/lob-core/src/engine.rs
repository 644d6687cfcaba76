//! Engine facade: the single command entry point.
//!
//! Validates inputs, assigns monotonic order ids, dispatches to the
//! matcher, and exposes the trade log and book snapshots. Strictly
//! single-threaded and synchronous: every effect of a call is committed
//! before it returns. Callers needing concurrency serialize externally.

use std::collections::HashMap;

use tracing::debug;

use crate::error::EngineError;
use crate::matcher;
use crate::order::{Order, OrderStatus};
use crate::order_book::OrderBook;
use crate::side::Side;
use crate::snapshot::{BookSnapshot, TopOfBookSnapshot};
use crate::trade::Trade;
use crate::trades::TradeExecutor;

/// Optional engine knobs. `Default` is a sensible production setup.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Reserve space in the id index, order arena, and trade log.
    pub initial_capacity_hint: usize,

    /// When false, the engine re-verifies every book invariant after each
    /// mutating call and aborts on the first violation. Observable
    /// behavior is identical either way.
    pub fast_path: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_capacity_hint: 0,
            fast_path: true,
        }
    }
}

/// Matching engine for a single instrument.
///
/// Owns the order book, the order and trade id counters, and the
/// append-only trade log. Starts empty; nothing is persisted.
#[derive(Debug)]
pub struct MatchingEngine {
    book: OrderBook,
    executor: TradeExecutor,
    next_order_id: u64,

    /// Final status of every departed order, so fills and cancels stay
    /// observable after the order leaves the book.
    terminal: HashMap<u64, OrderStatus>,

    fast_path: bool,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        MatchingEngine::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        MatchingEngine::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let hint = config.initial_capacity_hint;
        MatchingEngine {
            book: OrderBook::with_capacity(hint),
            executor: TradeExecutor::with_capacity(hint),
            next_order_id: 1,
            terminal: HashMap::with_capacity(hint),
            fast_path: config.fast_path,
        }
    }

    /// Submit a limit order. Returns the assigned order id.
    ///
    /// Any trades generated are appended to the log before this returns;
    /// a residual rests in the book at `price`.
    pub fn submit_limit(
        &mut self,
        side: Side,
        price: f64,
        quantity: f64,
        timestamp: u64,
    ) -> Result<u64, EngineError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(EngineError::InvalidPrice(price));
        }
        validate_quantity(quantity)?;

        let id = self.next_order_id;
        self.next_order_id += 1;

        debug!(id, ?side, price, quantity, "limit order accepted");

        let mut order = Order::new_limit(id, side, price, quantity, timestamp);
        matcher::match_order(&mut self.book, &mut self.executor, &mut self.terminal, &mut order);

        if !self.fast_path {
            self.book.assert_invariants();
        }
        Ok(id)
    }

    /// Submit a market order. Returns the assigned order id.
    ///
    /// Executes against the whole opposite side if needed; any remainder
    /// is discarded and the order ends `Cancelled` (or `Filled` when
    /// fully executed).
    pub fn submit_market(
        &mut self,
        side: Side,
        quantity: f64,
        timestamp: u64,
    ) -> Result<u64, EngineError> {
        validate_quantity(quantity)?;

        let id = self.next_order_id;
        self.next_order_id += 1;

        debug!(id, ?side, quantity, "market order accepted");

        let mut order = Order::new_market(id, side, quantity, timestamp);
        matcher::match_order(&mut self.book, &mut self.executor, &mut self.terminal, &mut order);

        if !self.fast_path {
            self.book.assert_invariants();
        }
        Ok(id)
    }

    /// Cancel a resting order.
    ///
    /// True if a live order was removed. False for unknown ids, filled or
    /// already-cancelled orders, and market orders; never an error.
    pub fn cancel(&mut self, order_id: u64) -> bool {
        match self.book.remove(order_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                self.terminal.insert(order_id, OrderStatus::Cancelled);
                debug!(order_id, "order cancelled");
                if !self.fast_path {
                    self.book.assert_invariants();
                }
                true
            }
            None => false,
        }
    }

    /// Trades at or after `cursor` plus the cursor for the next read.
    /// The log is append-only; consumers read forward.
    pub fn trades_since(&self, cursor: usize) -> (&[Trade], usize) {
        self.executor.trades_since(cursor)
    }

    /// Trades appended since the previous drain.
    pub fn drain_trades(&mut self) -> Vec<Trade> {
        self.executor.drain()
    }

    pub fn trade_count(&self) -> usize {
        self.executor.trade_count()
    }

    /// Aggregated book depth, best-first on both sides.
    pub fn snapshot(&mut self) -> BookSnapshot {
        self.book.snapshot()
    }

    pub fn top_of_book(&mut self) -> TopOfBookSnapshot {
        self.book.top_of_book()
    }

    /// A resting order by id. Departed orders return `None`; their final
    /// status is available from [`order_status`](Self::order_status).
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.book.order(order_id)
    }

    /// Current status of any order this engine has ever accepted.
    pub fn order_status(&self, order_id: u64) -> Option<OrderStatus> {
        self.book
            .order(order_id)
            .map(|order| order.status)
            .or_else(|| self.terminal.get(&order_id).copied())
    }

    /// Number of currently resting orders.
    pub fn open_order_count(&self) -> usize {
        self.book.order_count()
    }

    /// Read access to the book for inspection and tests.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }
}

fn validate_quantity(quantity: f64) -> Result<(), EngineError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidQuantity(quantity))
    }
}
