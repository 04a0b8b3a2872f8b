use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::orders::{Order, Side};
use crate::tree::PriceTree;

/// A [`Book`] holds the resting orders of one instrument in two
/// [`PriceTree`]s:
/// - `bids` (buy orders), matched from the highest price down
/// - `asks` (sell orders), matched from the lowest price up
///
/// The book itself is plain data; the engine serializes all mutation behind a
/// single mutex, held for the full insert-and-match of each submission.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub bids: PriceTree,
    pub asks: PriceTree,
}

/// Aggregated depth view of the book, one `(price, unfilled quantity)` entry
/// per level. Bids are listed best (highest) first, asks best (lowest) first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<(u64, u64)>,
    pub asks: Vec<(u64, u64)>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes the order to the tree for its side.
    ///
    /// Only unexhausted limit orders belong in the book; market orders never
    /// rest.
    pub fn insert(&mut self, order: Order) {
        debug_assert!(!order.is_exhausted());
        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
    }

    /// Best price an incoming order on `side` could match against: the lowest
    /// ask for a buy, the highest bid for a sell.
    pub fn best_opposite(&self, side: Side) -> Option<u64> {
        match side {
            Side::Buy => self.asks.find_min(),
            Side::Sell => self.bids.find_max(),
        }
    }

    /// The tree an incoming order on `side` matches against.
    pub fn opposite_mut(&mut self, side: Side) -> &mut PriceTree {
        match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        }
    }

    /// Removes a specific order by id from whichever side holds it.
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let removed = self
            .bids
            .remove(order_id)
            .or_else(|| self.asks.remove(order_id));
        if removed.is_none() {
            warn!("remove: order {} not resting in either tree", order_id);
        }
        removed
    }

    pub fn contains(&self, order_id: u64) -> bool {
        self.bids.contains(order_id) || self.asks.contains(order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Point-in-time aggregated depth, bids descending and asks ascending.
    pub fn snapshot(&self) -> BookSnapshot {
        let mut bids = self.bids.depth();
        bids.reverse();
        BookSnapshot {
            bids,
            asks: self.asks.depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderKind;
    use std::time::SystemTime;

    fn sample_order(id: u64, side: Side, price: u64, open: u64) -> Order {
        Order {
            id,
            account_id: "acct".into(),
            side,
            kind: OrderKind::Limit,
            price,
            open,
            filled: 0,
            history: Vec::new(),
            created_at: id,
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn insert_routes_by_side() {
        let mut book = Book::new();
        book.insert(sample_order(1, Side::Buy, 50, 1));
        book.insert(sample_order(2, Side::Sell, 60, 1));

        assert!(book.bids.contains(1));
        assert!(book.asks.contains(2));
    }

    #[test]
    fn best_opposite_picks_lowest_ask_for_buys() {
        let mut book = Book::new();
        book.insert(sample_order(1, Side::Sell, 60, 1));
        book.insert(sample_order(2, Side::Sell, 55, 1));

        assert_eq!(book.best_opposite(Side::Buy), Some(55));
    }

    #[test]
    fn best_opposite_picks_highest_bid_for_sells() {
        let mut book = Book::new();
        book.insert(sample_order(1, Side::Buy, 48, 1));
        book.insert(sample_order(2, Side::Buy, 52, 1));

        assert_eq!(book.best_opposite(Side::Sell), Some(52));
    }

    #[test]
    fn best_opposite_on_empty_side_is_none() {
        let book = Book::new();
        assert_eq!(book.best_opposite(Side::Buy), None);
        assert_eq!(book.best_opposite(Side::Sell), None);
    }

    #[test]
    fn remove_searches_both_sides() {
        let mut book = Book::new();
        book.insert(sample_order(1, Side::Buy, 50, 1));
        book.insert(sample_order(2, Side::Sell, 60, 1));

        assert_eq!(book.remove(2).unwrap().id, 2);
        assert_eq!(book.remove(1).unwrap().id, 1);
        assert!(book.remove(1).is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn snapshot_orders_bids_descending_asks_ascending() {
        let mut book = Book::new();
        book.insert(sample_order(1, Side::Buy, 48, 2));
        book.insert(sample_order(2, Side::Buy, 50, 1));
        book.insert(sample_order(3, Side::Sell, 55, 4));
        book.insert(sample_order(4, Side::Sell, 52, 3));

        let snap = book.snapshot();
        assert_eq!(snap.bids, vec![(50, 1), (48, 2)]);
        assert_eq!(snap.asks, vec![(52, 3), (55, 4)]);
    }
}
