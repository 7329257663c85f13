//! Side book: the price-time priority index over open priced orders (C3).
//!
//! Bids and asks share one abstract structure — a sorted index of
//! `(rank_price, create_time, sequence)` keys over a single `order_id`
//! lookup map — so the implementation below is one generic `Book` rather
//! than two duplicated types, per the Design Notes' "unify buy/sell"
//! guidance.

use std::collections::BTreeMap;
use std::time::SystemTime;

use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::order::{Order, RankKey, Side};

/// One aggregated price point in a book snapshot: the sum of `remaining`
/// across every open order resting at `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    /// The resting price.
    pub price: Decimal,
    /// Aggregate remaining quantity at this price.
    pub quantity: Decimal,
}

/// A value-typed, point-in-time snapshot of a symbol's order book.
///
/// Snapshots never alias engine state (invariant P8): subsequent mutation
/// of the live book has no effect on a snapshot already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBookSnapshot {
    /// The symbol this snapshot is for.
    pub symbol: String,
    /// Bids, strictly descending by price, best first.
    pub bids: Vec<PriceLevel>,
    /// Asks, strictly ascending by price, best first.
    pub asks: Vec<PriceLevel>,
    /// When this snapshot was taken.
    pub timestamp: SystemTime,
}

/// The price-time priority index for one symbol.
///
/// `open_orders` is the single shared lookup both sides (and the engine
/// and coordinator) use to find a resting order in O(1) by id; the
/// `BTreeMap`s hold only `(rank_key -> order_id)` pairs, never ownership.
#[derive(Debug, Default)]
pub struct Book {
    bids: BTreeMap<RankKey, Uuid>,
    asks: BTreeMap<RankKey, Uuid>,
    pub(crate) open_orders: DashMap<Uuid, Order>,
}

impl Book {
    /// A fresh, empty book.
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, side: Side) -> &BTreeMap<RankKey, Uuid> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn index_mut(&mut self, side: Side) -> &mut BTreeMap<RankKey, Uuid> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// The top-ranked open order on `side`, if any.
    ///
    /// Returns a clone: callers mutate the order through `open_orders`
    /// directly (push a trade, then call `pop`/`remove` as needed), never
    /// through this reference.
    pub fn best(&self, side: Side) -> Option<Order> {
        let (_, order_id) = self.index(side).iter().next()?;
        self.open_orders.get(order_id).map(|r| r.clone())
    }

    /// Removes and returns the top-ranked order on `side`. Callers use
    /// this once an order has become fully filled.
    pub fn pop(&mut self, side: Side) -> Option<Order> {
        let key = *self.index(side).keys().next()?;
        let order_id = self.index_mut(side).remove(&key)?;
        self.open_orders.remove(&order_id).map(|(_, order)| order)
    }

    /// Inserts a new resting order into its side's index and into
    /// `open_orders`.
    pub fn insert(&mut self, order: Order) {
        let key = RankKey::for_order(&order, order.side);
        let side = order.side;
        let order_id = order.order_id;
        self.open_orders.insert(order_id, order);
        self.index_mut(side).insert(key, order_id);
    }

    /// Removes a specific resting order (used by cancellation). Returns
    /// the removed order, if it was resting.
    pub fn remove(&mut self, order_id: Uuid) -> Option<Order> {
        let order = self.open_orders.get(&order_id)?.clone();
        let key = RankKey::for_order(&order, order.side);
        self.index_mut(order.side).remove(&key);
        self.open_orders.remove(&order_id).map(|(_, order)| order)
    }

    /// Writes a mutated order back into `open_orders` without touching
    /// its position in the side index (used after a fill that leaves the
    /// order resting: its rank key — price and arrival time — never
    /// changes mid-life, only its `trades`).
    pub fn update(&mut self, order: Order) {
        self.open_orders.insert(order.order_id, order);
    }

    /// Look up any order (resting or not) by id.
    pub fn get(&self, order_id: Uuid) -> Option<Order> {
        self.open_orders.get(&order_id).map(|r| r.clone())
    }

    /// Aggregated levels for `side`, best price first, zero-quantity
    /// levels omitted.
    pub fn levels(&self, side: Side) -> Vec<PriceLevel> {
        let mut by_price: BTreeMap<Decimal, Decimal> = BTreeMap::new();
        for order_id in self.index(side).values() {
            if let Some(order) = self.open_orders.get(order_id) {
                *by_price.entry(order.price).or_insert(Decimal::ZERO) += order.remaining();
            }
        }
        by_price.retain(|_, qty| !qty.is_zero());

        let mut levels: Vec<PriceLevel> = by_price
            .into_iter()
            .map(|(price, quantity)| PriceLevel { price, quantity })
            .collect();
        match side {
            // bids are keyed by -price, so ascending BTreeMap order over
            // `price` itself must be reversed to get highest-first.
            Side::Buy => levels.reverse(),
            Side::Sell => {}
        }
        levels
    }

    /// A full snapshot of both sides.
    pub fn snapshot(&self, symbol: &str, now: SystemTime) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: symbol.to_string(),
            bids: self.levels(Side::Buy),
            asks: self.levels(Side::Sell),
            timestamp: now,
        }
    }

    /// A stable snapshot of every open order's id, used by `cancel_all` so
    /// that cancellation iterates over a fixed list rather than the live,
    /// mutating index.
    pub fn open_order_ids(&self) -> Vec<Uuid> {
        self.open_orders.iter().map(|r| *r.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_order(side: Side, price: Decimal, size: Decimal, seq: u64) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            user_id: None,
            symbol: "FOOBAR".into(),
            side,
            order_type: crate::order::OrderType::LimitOrder,
            size,
            price,
            create_time: SystemTime::UNIX_EPOCH + std::time::Duration::from_nanos(seq),
            sequence: seq,
            order_tag: None,
            trades: vec![],
            canceled_at: None,
        }
    }

    #[test]
    fn best_returns_highest_bid_and_lowest_ask() {
        let mut book = Book::new();
        book.insert(make_order(Side::Buy, dec!(99), dec!(10), 1));
        book.insert(make_order(Side::Buy, dec!(100), dec!(10), 2));
        book.insert(make_order(Side::Sell, dec!(105), dec!(10), 3));
        book.insert(make_order(Side::Sell, dec!(104), dec!(10), 4));

        assert_eq!(book.best(Side::Buy).unwrap().price, dec!(100));
        assert_eq!(book.best(Side::Sell).unwrap().price, dec!(104));
    }

    #[test]
    fn ties_break_by_earliest_create_time() {
        let mut book = Book::new();
        let earlier = make_order(Side::Buy, dec!(100), dec!(10), 1);
        let earlier_id = earlier.order_id;
        book.insert(earlier);
        book.insert(make_order(Side::Buy, dec!(100), dec!(10), 2));

        assert_eq!(book.best(Side::Buy).unwrap().order_id, earlier_id);
    }

    #[test]
    fn levels_aggregate_remaining_by_price_best_first() {
        let mut book = Book::new();
        book.insert(make_order(Side::Buy, dec!(100), dec!(10), 1));
        book.insert(make_order(Side::Buy, dec!(100), dec!(5), 2));
        book.insert(make_order(Side::Buy, dec!(99), dec!(7), 3));

        let levels = book.levels(Side::Buy);
        assert_eq!(
            levels,
            vec![
                PriceLevel {
                    price: dec!(100),
                    quantity: dec!(15)
                },
                PriceLevel {
                    price: dec!(99),
                    quantity: dec!(7)
                },
            ]
        );
    }

    #[test]
    fn remove_drops_from_index_and_lookup() {
        let mut book = Book::new();
        let order = make_order(Side::Buy, dec!(100), dec!(10), 1);
        let id = order.order_id;
        book.insert(order);
        assert!(book.remove(id).is_some());
        assert!(book.best(Side::Buy).is_none());
        assert!(book.get(id).is_none());
    }

    #[test]
    fn empty_levels_are_omitted() {
        let book = Book::new();
        assert!(book.levels(Side::Buy).is_empty());
        assert!(book.levels(Side::Sell).is_empty());
    }
}
