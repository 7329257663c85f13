//! Order identity and mutation envelope (C2).

use std::time::SystemTime;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::trade::Trade;

/// Which side of the book an order rests on.
///
/// `sign(side)` unifies the buy/sell cross predicate into one expression:
/// `Side::Buy` is `+1`, `Side::Sell` is `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// A bid: willing to buy at or below `price`.
    Buy,
    /// An ask: willing to sell at or above `price`.
    Sell,
}

impl Side {
    /// `+1` for `Buy`, `-1` for `Sell`.
    pub fn sign(self) -> i32 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    /// The side an incoming order of `self` matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// `sign(side) * x`, the sugar the cross predicate is built from.
    pub fn scale(self, x: Decimal) -> Decimal {
        match self {
            Side::Buy => x,
            Side::Sell => -x,
        }
    }
}

/// The taxonomy of order types this core accepts.
///
/// Only `LimitOrder` is implemented; the variant exists so the taxonomy is
/// extensible without changing the admission signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    /// A priced order that rests on the book until filled or canceled.
    LimitOrder,
}

/// An order's terminal/non-terminal lifecycle state, derived from its
/// fields rather than stored directly (see [`Order::completed`],
/// [`Order::is_canceled`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    /// Resting in a side book, partially or not at all filled.
    Open,
    /// `dealt == size`.
    Completed,
    /// Canceled while `dealt < size`.
    Canceled,
}

/// A limit order: identity-immutable fields plus a controlled mutation
/// surface (`push_trade`, `cancel`). `dealt`/`remaining`/`completed` are
/// always recomputed from `trades`, never stored, so they can never drift
/// out of sync with the fills that produced them (invariant O1/O2).
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique identifier, assigned on construction.
    pub order_id: Uuid,
    /// `None` denotes an anonymous/house order with no ledger effects.
    pub user_id: Option<String>,
    /// The symbol this order trades.
    pub symbol: String,
    /// Buy or sell.
    pub side: Side,
    /// The order type (only `LimitOrder` is matched by this core).
    pub order_type: OrderType,
    /// The order's total size. Always `> 0`.
    pub size: Decimal,
    /// The limit price. Always `> 0`.
    pub price: Decimal,
    /// Monotonic tie-breaker, stamped by the coordinator inside the
    /// admission critical section (see `SPEC_FULL.md` OQ3).
    pub create_time: SystemTime,
    /// Sequence number assigned at admission, used as a secondary,
    /// infallible tie-breaker alongside `create_time` (two orders can
    /// share a `SystemTime` tick; they can never share a sequence).
    pub sequence: u64,
    /// An optional free-form label a caller can use to correlate this
    /// order with an external strategy id. Carried over from the source
    /// platform's `order_tag`; has no effect on matching or settlement.
    pub order_tag: Option<String>,
    /// Fills applied to this order, in the order they occurred.
    pub trades: Vec<Trade>,
    /// Set when the order is canceled while not yet fully filled.
    pub canceled_at: Option<SystemTime>,
}

impl Order {
    /// Total quantity filled so far: `sum(trades[i].amount)`.
    pub fn dealt(&self) -> Decimal {
        self.trades.iter().map(|t| t.amount).sum()
    }

    /// `size - dealt`. Always `>= 0` (invariant O1).
    pub fn remaining(&self) -> Decimal {
        self.size - self.dealt()
    }

    /// `true` once `dealt == size`.
    pub fn completed(&self) -> bool {
        self.dealt() == self.size
    }

    /// `true` if this order was canceled (regardless of how much of it
    /// had been filled at that point).
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }

    /// The order's current lifecycle state (invariant O2: exactly one of
    /// these three holds at any time).
    pub fn state(&self) -> OrderState {
        if self.canceled_at.is_some() {
            OrderState::Canceled
        } else if self.completed() {
            OrderState::Completed
        } else {
            OrderState::Open
        }
    }

    /// Append a fill. The only way `trades` is ever mutated.
    pub(crate) fn push_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Stamp `canceled_at`. The only way cancellation is recorded.
    pub(crate) fn cancel(&mut self, at: SystemTime) {
        self.canceled_at = Some(at);
    }

    /// `true` for a house/anonymous order: has no ledger effects.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// The triple a side book ranks resting orders by: best price first, ties
/// broken by earliest `create_time`, then by `sequence` (stable,
/// deterministic — never by `order_id`, whose `Uuid` ordering is
/// meaningless and would make tie-breaking effectively random).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RankKey {
    pub rank_price: Decimal,
    pub create_time_nanos: u128,
    pub sequence: u64,
}

impl RankKey {
    pub(crate) fn for_order(order: &Order, side: Side) -> Self {
        let rank_price = match side {
            Side::Buy => -order.price,
            Side::Sell => order.price,
        };
        Self {
            rank_price,
            create_time_nanos: order
                .create_time
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            sequence: order.sequence,
        }
    }
}
