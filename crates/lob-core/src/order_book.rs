//! Single-instrument order book with price-time priority.
//!
//! - Bids: best = highest price.
//! - Asks: best = lowest price.
//! - FIFO within each price level.
//!
//! Both sides are `BTreeMap`s keyed by [`PriceKey`], a total-ordered
//! integer surrogate for the f64 price. The buy side's keys are
//! complemented at construction, so ascending key iteration is best-first
//! on either side and the hot loops never compare floats.
//!
//! Resting orders live in a slab arena shared by both sides; an id index
//! maps order id to slab key. Cancellation is a hash lookup plus an O(1)
//! unlink, never a scan.

use std::collections::{BTreeMap, HashMap};

use slab::Slab;

use crate::node::OrderNode;
use crate::order::{Order, OrderStatus};
use crate::price_key::PriceKey;
use crate::price_level::PriceLevel;
use crate::side::Side;
use crate::snapshot::{BookSnapshot, TopOfBookSnapshot};

#[derive(Debug, Default)]
pub struct OrderBook {
    /// Bid levels; smallest key = highest price.
    pub(crate) bids: BTreeMap<PriceKey, PriceLevel>,

    /// Ask levels; smallest key = lowest price.
    pub(crate) asks: BTreeMap<PriceKey, PriceLevel>,

    /// Storage for every resting order on both sides.
    pub(crate) arena: Slab<OrderNode>,

    /// Order id -> slab key, for O(1) cancellation.
    pub(crate) id_index: HashMap<u64, usize>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook::default()
    }

    /// Pre-size the arena and id index for an expected number of
    /// simultaneously resting orders.
    pub fn with_capacity(capacity: usize) -> Self {
        OrderBook {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            arena: Slab::with_capacity(capacity),
            id_index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a limit order as a resting order on its side.
    ///
    /// The order keeps whatever status it arrived with (`New`, or
    /// `PartiallyFilled` for an aggressor residual).
    pub fn insert(&mut self, order: Order) {
        debug_assert!(order.price.is_some(), "only limit orders rest in the book");
        debug_assert!(
            !matches!(order.status, OrderStatus::Filled | OrderStatus::Cancelled),
            "terminal order inserted into book"
        );

        let side = order.side;
        let price = order.limit_price();
        let id = order.id;
        let key = PriceKey::new(side, price);

        let slab_key = self.arena.insert(OrderNode::new(order));
        let level = match side {
            Side::Buy => self.bids.entry(key),
            Side::Sell => self.asks.entry(key),
        }
        .or_insert_with(|| PriceLevel::new(price));
        level.push_back(slab_key, &mut self.arena);
        self.id_index.insert(id, slab_key);
    }

    /// Remove a resting order by id.
    ///
    /// Returns the removed order so the caller can advance its status, or
    /// `None` if the id is unknown or already departed. The order's level
    /// is dropped if it becomes empty.
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let slab_key = self.id_index.remove(&order_id)?;

        let (side, price) = {
            let order = &self.arena[slab_key].order;
            (order.side, order.limit_price())
        };
        let key = PriceKey::new(side, price);

        let level = match side {
            Side::Buy => self.bids.get_mut(&key),
            Side::Sell => self.asks.get_mut(&key),
        }
        .expect("id index points at a missing price level");

        level.unlink(slab_key, &mut self.arena);
        let now_empty = level.is_empty();
        if now_empty {
            self.side_mut(side).remove(&key);
        }

        Some(self.arena.remove(slab_key).order)
    }

    /// Best (price, level) on a side, if any.
    pub fn best(&self, side: Side) -> Option<(f64, &PriceLevel)> {
        self.side(side)
            .first_key_value()
            .map(|(_, level)| (level.price(), level))
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.best(Side::Buy).map(|(price, _)| price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.best(Side::Sell).map(|(price, _)| price)
    }

    /// Levels on a side in best-first order: descending price for bids,
    /// ascending for asks. Within a level, orders are in arrival order.
    pub fn levels(&self, side: Side) -> impl Iterator<Item = (f64, &PriceLevel)> + '_ {
        self.side(side).values().map(|level| (level.price(), level))
    }

    /// A resting order by id, if present.
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        let slab_key = self.id_index.get(&order_id)?;
        Some(&self.arena[*slab_key].order)
    }

    pub fn contains(&self, order_id: u64) -> bool {
        self.id_index.contains_key(&order_id)
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.id_index.len()
    }

    pub fn level_count(&self, side: Side) -> usize {
        self.side(side).len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    /// Aggregated (price, total remaining) per level, best-first on both
    /// sides. Refreshes any dirty level caches.
    pub fn snapshot(&mut self) -> BookSnapshot {
        let arena = &self.arena;
        let bids = self
            .bids
            .values_mut()
            .map(|level| (level.price(), level.total_quantity(arena)))
            .collect();
        let asks = self
            .asks
            .values_mut()
            .map(|level| (level.price(), level.total_quantity(arena)))
            .collect();
        BookSnapshot { bids, asks }
    }

    /// Best bid and ask with their aggregated quantities.
    pub fn top_of_book(&mut self) -> TopOfBookSnapshot {
        let arena = &self.arena;
        let bid = self
            .bids
            .first_entry()
            .map(|mut e| (e.get().price(), e.get_mut().total_quantity(arena)));
        let ask = self
            .asks
            .first_entry()
            .map(|mut e| (e.get().price(), e.get_mut().total_quantity(arena)));
        TopOfBookSnapshot { bid, ask }
    }

    /// Exhaustive structural self-check. Panics on the first violation;
    /// an inconsistent book is a bug, not a recoverable state.
    pub fn assert_invariants(&self) {
        let mut seen = 0usize;

        for (side, levels) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for level in levels.values() {
                assert!(!level.is_empty(), "empty price level left in book");

                let mut total = 0.0;
                for key in level.iter_keys(&self.arena) {
                    let order = &self.arena[key].order;
                    assert_eq!(order.side, side, "order on the wrong side");
                    assert_eq!(
                        order.limit_price(),
                        level.price(),
                        "order price differs from its level"
                    );
                    assert!(
                        order.remaining_quantity > 0.0,
                        "exhausted order resting in book"
                    );
                    assert!(
                        matches!(order.status, OrderStatus::New | OrderStatus::PartiallyFilled),
                        "terminal order resting in book"
                    );
                    assert_eq!(
                        self.id_index.get(&order.id),
                        Some(&key),
                        "id index out of sync with level contents"
                    );
                    total += order.remaining_quantity;
                    seen += 1;
                }

                let (cached, dirty) = level.cache_state();
                if !dirty {
                    assert!(
                        (cached - total).abs() < 1e-6,
                        "clean level cache disagrees with order sum"
                    );
                }
            }
        }

        assert_eq!(seen, self.id_index.len(), "id index size mismatch");
        assert_eq!(seen, self.arena.len(), "arena holds unindexed orders");

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            assert!(bid < ask, "crossed book at rest: bid {} >= ask {}", bid, ask);
        }
    }

    fn side(&self, side: Side) -> &BTreeMap<PriceKey, PriceLevel> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<PriceKey, PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}
