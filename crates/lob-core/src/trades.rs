//! Trade execution and the append-only trade log.

use crate::order::{Order, OrderStatus};
use crate::trade::Trade;

/// Applies fills to order pairs and records the resulting trades.
///
/// Owns the monotonic trade id counter. The log is append-only; trades
/// are never mutated or removed, and consumers read forward either by
/// absolute cursor or through the drain position.
#[derive(Debug, Default)]
pub struct TradeExecutor {
    next_trade_id: u64,
    trades: Vec<Trade>,
    drain_cursor: usize,
}

impl TradeExecutor {
    pub fn new() -> Self {
        TradeExecutor {
            next_trade_id: 1,
            trades: Vec::new(),
            drain_cursor: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TradeExecutor {
            next_trade_id: 1,
            trades: Vec::with_capacity(capacity),
            drain_cursor: 0,
        }
    }

    /// Execute a fill of `quantity` at `price` between the two orders.
    ///
    /// Decrements both remainings, advances both statuses, and appends
    /// the trade record. `timestamp` is the aggressor's timestamp.
    pub fn execute(
        &mut self,
        buy_order: &mut Order,
        sell_order: &mut Order,
        price: f64,
        quantity: f64,
        timestamp: u64,
    ) {
        buy_order.fill(quantity);
        sell_order.fill(quantity);

        buy_order.status = status_after_fill(buy_order);
        sell_order.status = status_after_fill(sell_order);

        let trade = Trade {
            id: self.next_trade_id,
            buy_order_id: buy_order.id,
            sell_order_id: sell_order.id,
            price,
            quantity,
            timestamp,
        };
        self.next_trade_id += 1;
        self.trades.push(trade);
    }

    /// All trades at or after `cursor`, plus the cursor one past the end
    /// of the log. A cursor of 0 reads from the beginning.
    pub fn trades_since(&self, cursor: usize) -> (&[Trade], usize) {
        let start = cursor.min(self.trades.len());
        (&self.trades[start..], self.trades.len())
    }

    /// Trades appended since the previous drain.
    ///
    /// The log itself is retained, so absolute cursors from
    /// [`trades_since`](Self::trades_since) stay valid.
    pub fn drain(&mut self) -> Vec<Trade> {
        let drained = self.trades[self.drain_cursor..].to_vec();
        self.drain_cursor = self.trades.len();
        drained
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn last_trade(&self) -> Option<&Trade> {
        self.trades.last()
    }
}

fn status_after_fill(order: &Order) -> OrderStatus {
    if order.remaining_quantity <= crate::matcher::QTY_EPSILON {
        OrderStatus::Filled
    } else {
        OrderStatus::PartiallyFilled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::Side;

    #[test]
    fn execute_updates_both_orders_and_logs_trade() {
        let mut executor = TradeExecutor::new();
        let mut buy = Order::new_limit(1, Side::Buy, 101.0, 2.0, 10);
        let mut sell = Order::new_limit(2, Side::Sell, 100.0, 1.5, 5);

        executor.execute(&mut buy, &mut sell, 100.0, 1.5, 10);

        assert_eq!(buy.status, OrderStatus::PartiallyFilled);
        assert_eq!(buy.remaining_quantity, 0.5);
        assert_eq!(sell.status, OrderStatus::Filled);
        assert_eq!(sell.remaining_quantity, 0.0);

        let (trades, cursor) = executor.trades_since(0);
        assert_eq!(cursor, 1);
        assert_eq!(trades[0].id, 1);
        assert_eq!(trades[0].buy_order_id, 1);
        assert_eq!(trades[0].sell_order_id, 2);
        assert_eq!(trades[0].price, 100.0);
        assert_eq!(trades[0].timestamp, 10);
    }

    #[test]
    fn drain_returns_only_new_trades() {
        let mut executor = TradeExecutor::new();
        let mut buy = Order::new_limit(1, Side::Buy, 100.0, 2.0, 1);
        let mut sell = Order::new_limit(2, Side::Sell, 100.0, 2.0, 1);

        executor.execute(&mut buy, &mut sell, 100.0, 1.0, 1);
        assert_eq!(executor.drain().len(), 1);
        assert!(executor.drain().is_empty());

        executor.execute(&mut buy, &mut sell, 100.0, 1.0, 2);
        let drained = executor.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].id, 2);

        // Absolute cursors still see the whole log.
        assert_eq!(executor.trades_since(0).0.len(), 2);
    }
}
