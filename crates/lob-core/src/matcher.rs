//! Order matching against the opposite side of the book.
//!
//! The matcher walks the opposing side best-first and fills against each
//! level's FIFO until the aggressor is exhausted, the next level is no
//! longer price-compatible, or the side is empty. Trades execute at the
//! maker's price. Exhausted makers and emptied levels are removed
//! immediately, so the book is never crossed at rest.
//!
//! Residual policy: a limit aggressor with quantity left rests at its
//! limit price; a market aggressor's remainder is discarded and the order
//! ends `Filled` if fully executed, `Cancelled` otherwise.

use std::collections::HashMap;

use crate::order::{Order, OrderStatus};
use crate::order_book::OrderBook;
use crate::order_type::OrderType;
use crate::side::Side;
use crate::trades::TradeExecutor;

/// Absolute tolerance below which a remaining quantity counts as zero.
///
/// This is the only place floating-point slack is applied; price
/// comparisons are exact.
pub const QTY_EPSILON: f64 = 1e-9;

/// Match `order` against the book, then apply the residual policy.
///
/// Trades are appended to `executor` in generation order: across levels
/// best-first, within a level in arrival order. Orders that reach a
/// terminal state here are recorded in `terminal`.
pub(crate) fn match_order(
    book: &mut OrderBook,
    executor: &mut TradeExecutor,
    terminal: &mut HashMap<u64, OrderStatus>,
    order: &mut Order,
) {
    match order.side {
        Side::Buy => match_buy(book, executor, terminal, order),
        Side::Sell => match_sell(book, executor, terminal, order),
    }

    match order.order_type {
        OrderType::Limit => {
            if order.remaining_quantity > QTY_EPSILON {
                // Rests as New if untouched, PartiallyFilled otherwise.
                book.insert(order.clone());
            } else {
                order.status = OrderStatus::Filled;
                terminal.insert(order.id, OrderStatus::Filled);
            }
        }
        OrderType::Market => {
            // Unfillable remainder is dropped, not rested.
            let status = if order.remaining_quantity <= QTY_EPSILON {
                OrderStatus::Filled
            } else {
                OrderStatus::Cancelled
            };
            order.status = status;
            terminal.insert(order.id, status);
        }
    }
}

fn match_buy(
    book: &mut OrderBook,
    executor: &mut TradeExecutor,
    terminal: &mut HashMap<u64, OrderStatus>,
    order: &mut Order,
) {
    let ts = order.timestamp;

    loop {
        if order.remaining_quantity <= QTY_EPSILON {
            break;
        }

        let Some((&key, level)) = book.asks.first_key_value() else {
            break;
        };
        let level_price = level.price();

        // Lower levels cannot be eligible either; the side is sorted.
        if order.order_type == OrderType::Limit && level_price > order.limit_price() {
            break;
        }

        let level = book.asks.get_mut(&key).expect("best ask level vanished");
        while order.remaining_quantity > QTY_EPSILON {
            let Some(maker_key) = level.front() else {
                break;
            };

            let maker = &mut book.arena[maker_key].order;
            let fill = order.remaining_quantity.min(maker.remaining_quantity);
            executor.execute(order, maker, level_price, fill, ts);
            level.record_fill(fill);

            if maker.remaining_quantity <= QTY_EPSILON {
                let maker_id = maker.id;
                level.unlink(maker_key, &mut book.arena);
                book.arena.remove(maker_key);
                book.id_index.remove(&maker_id);
                terminal.insert(maker_id, OrderStatus::Filled);
            }
        }

        if level.is_empty() {
            book.asks.remove(&key);
        }
    }
}

fn match_sell(
    book: &mut OrderBook,
    executor: &mut TradeExecutor,
    terminal: &mut HashMap<u64, OrderStatus>,
    order: &mut Order,
) {
    let ts = order.timestamp;

    loop {
        if order.remaining_quantity <= QTY_EPSILON {
            break;
        }

        let Some((&key, level)) = book.bids.first_key_value() else {
            break;
        };
        let level_price = level.price();

        if order.order_type == OrderType::Limit && level_price < order.limit_price() {
            break;
        }

        let level = book.bids.get_mut(&key).expect("best bid level vanished");
        while order.remaining_quantity > QTY_EPSILON {
            let Some(maker_key) = level.front() else {
                break;
            };

            let maker = &mut book.arena[maker_key].order;
            let fill = order.remaining_quantity.min(maker.remaining_quantity);
            executor.execute(maker, order, level_price, fill, ts);
            level.record_fill(fill);

            if maker.remaining_quantity <= QTY_EPSILON {
                let maker_id = maker.id;
                level.unlink(maker_key, &mut book.arena);
                book.arena.remove(maker_key);
                book.id_index.remove(&maker_id);
                terminal.insert(maker_id, OrderStatus::Filled);
            }
        }

        if level.is_empty() {
            book.bids.remove(&key);
        }
    }
}
