//! Immutable trade records (C2).

use std::time::SystemTime;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::order::Side;

/// One fill produced by a crossing match. Immutable once constructed;
/// appended to both orders' `trades` lists and to the engine's trade log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    /// Unique identifier for this trade.
    pub trade_id: Uuid,
    /// The resting (maker) order's price — the taker is the price
    /// improver (invariant M2, P4).
    pub price: Decimal,
    /// The quantity exchanged. Always `> 0`.
    pub amount: Decimal,
    /// The taker's `create_time`, used as the trade's timestamp.
    pub timestamp: SystemTime,
}

/// One `(order role, trade)` leg emitted by the matching step.
///
/// Every `Trade` produces exactly two `Fill`s: one tagged `Taker`, one
/// tagged `Maker`, so the settlement layer applies the ledger table in
/// `§4.5` exactly once per leg (see `SPEC_FULL.md` OQ2) rather than once
/// per `Trade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRole {
    /// This leg belongs to the order that initiated the match.
    Taker,
    /// This leg belongs to the resting order the taker matched against.
    Maker,
}

/// A single settlement instruction: "this order, in this role, just
/// participated in this trade". Carries the order's `user_id` and `side`
/// as they stood at the moment of the fill, so the ledger can settle the
/// leg without a second lookup into the engine.
#[derive(Debug, Clone)]
pub struct Fill {
    /// Which side of the pair this leg settles.
    pub role: FillRole,
    /// The id of the order this leg belongs to.
    pub order_id: Uuid,
    /// `None` for an anonymous/house order: no ledger effect.
    pub user_id: Option<String>,
    /// The order's side (buy/sell), which the settlement table keys on.
    pub side: Side,
    /// The trade that produced this leg.
    pub trade: Trade,
}
