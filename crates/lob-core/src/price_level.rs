//! A (side, price) bucket of resting orders.
//!
//! Orders at one price form a FIFO: matching consumes from the head,
//! new arrivals append at the tail. The level also carries a cached total
//! of remaining quantity with a dirty flag; fills maintain the cache
//! incrementally, cancellations just mark it dirty and the next read
//! recomputes it. Snapshots therefore aggregate without touching
//! individual orders in the common case.

use slab::Slab;

use crate::node::OrderNode;

/// All resting orders at a single price on one side.
///
/// Order data lives in the book's arena; the level holds only the queue
/// endpoints and the quantity cache. A level is removed from the book the
/// moment its last order departs, so a live level is never empty.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: f64,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    total_qty_cache: f64,
    dirty: bool,
}

impl PriceLevel {
    pub fn new(price: f64) -> Self {
        PriceLevel {
            price,
            head: None,
            tail: None,
            len: 0,
            total_qty_cache: 0.0,
            dirty: false,
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Oldest resting order at this price, i.e. the next maker.
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an order at the tail of the FIFO.
    pub fn push_back(&mut self, key: usize, arena: &mut Slab<OrderNode>) {
        let quantity = {
            let node = &mut arena[key];
            node.prev = self.tail;
            node.next = None;
            node.order.remaining_quantity
        };

        match self.tail {
            Some(tail_key) => arena[tail_key].next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.len += 1;
        self.total_qty_cache += quantity;
    }

    /// Unlink an order from anywhere in the FIFO and mark the cache dirty.
    ///
    /// The node itself stays in the arena; the caller removes it.
    pub fn unlink(&mut self, key: usize, arena: &mut Slab<OrderNode>) {
        let (prev, next) = {
            let node = &arena[key];
            (node.prev, node.next)
        };

        match prev {
            Some(p) => arena[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena[n].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut arena[key];
        node.prev = None;
        node.next = None;

        self.len -= 1;
        self.dirty = true;
    }

    /// Account for an execution against one of this level's orders.
    pub fn record_fill(&mut self, quantity: f64) {
        self.total_qty_cache -= quantity;
    }

    /// Total remaining quantity at this level, recomputing the cache if a
    /// cancellation left it dirty.
    pub fn total_quantity(&mut self, arena: &Slab<OrderNode>) -> f64 {
        if self.dirty {
            let mut total = 0.0;
            let mut cursor = self.head;
            while let Some(key) = cursor {
                let node = &arena[key];
                total += node.order.remaining_quantity;
                cursor = node.next;
            }
            self.total_qty_cache = total;
            self.dirty = false;
        }
        self.total_qty_cache
    }

    /// Cache state without refreshing, for invariant checks.
    pub fn cache_state(&self) -> (f64, bool) {
        (self.total_qty_cache, self.dirty)
    }

    /// Walk the FIFO head-to-tail, yielding slab keys in arrival order.
    pub fn iter_keys<'a>(&'a self, arena: &'a Slab<OrderNode>) -> impl Iterator<Item = usize> + 'a {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let key = cursor?;
            cursor = arena[key].next;
            Some(key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::side::Side;

    fn resting(id: u64, qty: f64) -> Order {
        Order::new_limit(id, Side::Sell, 100.0, qty, id)
    }

    fn push(level: &mut PriceLevel, arena: &mut Slab<OrderNode>, order: Order) -> usize {
        let key = arena.insert(OrderNode::new(order));
        level.push_back(key, arena);
        key
    }

    #[test]
    fn fifo_preserved_across_push_and_unlink() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::new(100.0);

        let a = push(&mut level, &mut arena, resting(1, 1.0));
        let b = push(&mut level, &mut arena, resting(2, 2.0));
        let c = push(&mut level, &mut arena, resting(3, 3.0));

        // Remove the middle order; arrival order of the rest must hold.
        level.unlink(b, &mut arena);
        arena.remove(b);

        let ids: Vec<u64> = level.iter_keys(&arena).map(|k| arena[k].order.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(level.front(), Some(a));
        assert_eq!(level.len(), 2);
        let _ = c;
    }

    #[test]
    fn cache_recomputes_after_unlink() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::new(100.0);

        push(&mut level, &mut arena, resting(1, 1.5));
        let b = push(&mut level, &mut arena, resting(2, 2.5));

        assert_eq!(level.total_quantity(&arena), 4.0);

        level.unlink(b, &mut arena);
        arena.remove(b);
        let (_, dirty) = level.cache_state();
        assert!(dirty);
        assert_eq!(level.total_quantity(&arena), 1.5);
        let (_, dirty) = level.cache_state();
        assert!(!dirty);
    }

    #[test]
    fn fills_keep_cache_clean() {
        let mut arena = Slab::new();
        let mut level = PriceLevel::new(100.0);

        let a = push(&mut level, &mut arena, resting(1, 2.0));
        arena[a].order.fill(0.5);
        level.record_fill(0.5);

        let (cached, dirty) = level.cache_state();
        assert!(!dirty);
        assert!((cached - 1.5).abs() < 1e-12);
    }
}
