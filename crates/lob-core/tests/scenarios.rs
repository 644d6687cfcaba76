//! End-to-end matching scenarios through the public engine API.

use lob_core::{MatchingEngine, OrderStatus, Side};

fn engine() -> MatchingEngine {
    MatchingEngine::new()
}

#[test]
fn exact_crossing_limit_orders_empty_the_book() {
    let mut engine = engine();

    let sell = engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    let buy = engine.submit_limit(Side::Buy, 100.0, 1.0, 2).unwrap();
    assert_eq!((sell, buy), (1, 2));

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades.len(), 1);
    let t = &trades[0];
    assert_eq!(t.id, 1);
    assert_eq!(t.buy_order_id, buy);
    assert_eq!(t.sell_order_id, sell);
    assert_eq!(t.price, 100.0);
    assert_eq!(t.quantity, 1.0);
    assert_eq!(t.timestamp, 2);

    let snap = engine.snapshot();
    assert!(snap.is_empty());
    assert_eq!(engine.order_status(sell), Some(OrderStatus::Filled));
    assert_eq!(engine.order_status(buy), Some(OrderStatus::Filled));
}

#[test]
fn partial_fill_leaves_aggressor_resting_at_its_limit() {
    let mut engine = engine();

    let sell = engine.submit_limit(Side::Sell, 101.0, 0.4, 1).unwrap();
    let buy = engine.submit_limit(Side::Buy, 102.0, 1.0, 2).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 101.0);
    assert_eq!(trades[0].quantity, 0.4);

    let snap = engine.snapshot();
    assert!(snap.asks.is_empty());
    assert_eq!(snap.bids.len(), 1);
    assert_eq!(snap.bids[0].0, 102.0);
    assert!((snap.bids[0].1 - 0.6).abs() < 1e-12);

    assert_eq!(engine.order_status(sell), Some(OrderStatus::Filled));
    assert_eq!(engine.order_status(buy), Some(OrderStatus::PartiallyFilled));
    let resting = engine.order(buy).unwrap();
    assert!((resting.remaining_quantity - 0.6).abs() < 1e-12);
}

#[test]
fn aggressor_walks_multiple_levels_best_first() {
    let mut engine = engine();

    let s1 = engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    let s2 = engine.submit_limit(Side::Sell, 101.0, 1.0, 2).unwrap();
    let s3 = engine.submit_limit(Side::Sell, 102.0, 1.0, 3).unwrap();
    let buy = engine.submit_limit(Side::Buy, 101.0, 1.7, 4).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades.len(), 2);

    assert_eq!(trades[0].sell_order_id, s1);
    assert_eq!(trades[0].price, 100.0);
    assert_eq!(trades[0].quantity, 1.0);

    assert_eq!(trades[1].sell_order_id, s2);
    assert_eq!(trades[1].price, 101.0);
    assert!((trades[1].quantity - 0.7).abs() < 1e-12);

    // 102 was never eligible for a 101 buy; the walk stopped there.
    let snap = engine.snapshot();
    assert!(snap.bids.is_empty());
    assert_eq!(snap.asks.len(), 2);
    assert_eq!(snap.asks[0].0, 101.0);
    assert!((snap.asks[0].1 - 0.3).abs() < 1e-12);
    assert_eq!(snap.asks[1], (102.0, 1.0));

    assert_eq!(engine.order_status(buy), Some(OrderStatus::Filled));
    assert_eq!(engine.order_status(s2), Some(OrderStatus::PartiallyFilled));
    assert_eq!(engine.order_status(s3), Some(OrderStatus::New));
}

#[test]
fn earlier_order_at_a_price_fills_first() {
    let mut engine = engine();

    let first = engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    let second = engine.submit_limit(Side::Sell, 100.0, 1.0, 2).unwrap();
    engine.submit_limit(Side::Buy, 100.0, 1.0, 3).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].sell_order_id, first);

    assert_eq!(engine.order_status(first), Some(OrderStatus::Filled));
    assert!(engine.order(second).is_some(), "later order must still rest");
}

#[test]
fn market_order_residual_is_discarded_as_cancelled() {
    let mut engine = engine();

    let sell = engine.submit_limit(Side::Sell, 100.0, 0.5, 1).unwrap();
    let market = engine.submit_market(Side::Buy, 1.0, 2).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 100.0);
    assert_eq!(trades[0].quantity, 0.5);

    let snap = engine.snapshot();
    assert!(snap.is_empty(), "market remainder must not rest");

    assert_eq!(engine.order_status(sell), Some(OrderStatus::Filled));
    assert_eq!(engine.order_status(market), Some(OrderStatus::Cancelled));
}

#[test]
fn fully_executed_market_order_is_filled() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, 100.0, 2.0, 1).unwrap();
    let market = engine.submit_market(Side::Buy, 1.0, 2).unwrap();

    assert_eq!(engine.order_status(market), Some(OrderStatus::Filled));
    let snap = engine.snapshot();
    assert_eq!(snap.asks, vec![(100.0, 1.0)]);
}

#[test]
fn market_order_against_empty_book_is_cancelled() {
    let mut engine = engine();

    let market = engine.submit_market(Side::Sell, 3.0, 1).unwrap();

    assert_eq!(engine.trade_count(), 0);
    assert_eq!(engine.order_status(market), Some(OrderStatus::Cancelled));
    assert!(engine.snapshot().is_empty());
}

#[test]
fn cancelled_order_cannot_be_matched_and_cancel_is_idempotent() {
    let mut engine = engine();

    let sell = engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    assert!(engine.cancel(sell));

    let buy = engine.submit_limit(Side::Buy, 100.0, 1.0, 2).unwrap();
    assert_eq!(engine.trade_count(), 0);

    let snap = engine.snapshot();
    assert!(snap.asks.is_empty());
    assert_eq!(snap.bids, vec![(100.0, 1.0)]);

    assert!(!engine.cancel(sell), "second cancel reports false");
    assert!(!engine.cancel(9999), "unknown id reports false");
    assert_eq!(engine.order_status(sell), Some(OrderStatus::Cancelled));
    let _ = buy;
}

#[test]
fn cancel_of_filled_order_reports_false() {
    let mut engine = engine();

    let sell = engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    engine.submit_limit(Side::Buy, 100.0, 1.0, 2).unwrap();

    assert!(!engine.cancel(sell));
    assert_eq!(engine.order_status(sell), Some(OrderStatus::Filled));
}

#[test]
fn trades_execute_at_maker_price_regardless_of_aggressor_limit() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, 101.0, 1.0, 1).unwrap();
    engine.submit_limit(Side::Buy, 105.0, 1.0, 2).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades[0].price, 101.0);

    // Symmetric: resting bid is the maker for a sell aggressor.
    engine.submit_limit(Side::Buy, 99.0, 1.0, 3).unwrap();
    engine.submit_limit(Side::Sell, 95.0, 1.0, 4).unwrap();

    let (trades, _) = engine.trades_since(0);
    assert_eq!(trades[1].price, 99.0);
}

#[test]
fn book_is_never_crossed_at_rest() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, 101.0, 1.0, 1).unwrap();
    engine.submit_limit(Side::Sell, 102.0, 2.0, 2).unwrap();
    engine.submit_limit(Side::Buy, 103.0, 3.5, 3).unwrap();

    let tob = engine.top_of_book();
    if let (Some((bid, _)), Some((ask, _))) = (tob.bid, tob.ask) {
        assert!(bid < ask);
    }

    // The crossing bid consumed both asks and rests alone.
    let snap = engine.snapshot();
    assert!(snap.asks.is_empty());
    assert_eq!(snap.bids.len(), 1);
    assert_eq!(snap.bids[0].0, 103.0);
    assert!((snap.bids[0].1 - 0.5).abs() < 1e-12);
}

#[test]
fn conservation_of_quantity_across_a_submit() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, 100.0, 0.3, 1).unwrap();
    engine.submit_limit(Side::Sell, 100.5, 0.4, 2).unwrap();
    engine.submit_limit(Side::Sell, 101.0, 0.6, 3).unwrap();

    let cursor = engine.trades_since(0).1;
    let buy = engine.submit_limit(Side::Buy, 100.5, 1.0, 4).unwrap();

    let (new_trades, _) = engine.trades_since(cursor);
    let traded: f64 = new_trades.iter().map(|t| t.quantity).sum();
    assert!((traded - 0.7).abs() < 1e-12);

    let resting = engine.order(buy).unwrap();
    assert!((resting.quantity - resting.remaining_quantity - traded).abs() < 1e-12);
}

#[test]
fn trade_ids_are_contiguous_and_aggressor_stamped() {
    let mut engine = engine();

    for i in 0..5u64 {
        engine
            .submit_limit(Side::Sell, 100.0 + i as f64, 1.0, 10 + i)
            .unwrap();
    }
    engine.submit_market(Side::Buy, 3.5, 99).unwrap();
    engine.submit_market(Side::Buy, 0.5, 100).unwrap();

    let (trades, _) = engine.trades_since(0);
    let ids: Vec<u64> = trades.iter().map(|t| t.id).collect();
    assert_eq!(ids, (1..=trades.len() as u64).collect::<Vec<_>>());

    assert!(trades[..4].iter().all(|t| t.timestamp == 99));
    assert_eq!(trades.last().unwrap().timestamp, 100);
}

#[test]
fn drain_trades_reads_forward_only() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, 100.0, 1.0, 1).unwrap();
    engine.submit_limit(Side::Buy, 100.0, 0.4, 2).unwrap();
    assert_eq!(engine.drain_trades().len(), 1);
    assert!(engine.drain_trades().is_empty());

    engine.submit_limit(Side::Buy, 100.0, 0.6, 3).unwrap();
    let drained = engine.drain_trades();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].id, 2);
}
