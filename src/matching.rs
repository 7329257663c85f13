//! The matching engine: one instance per symbol (C4).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use uuid::Uuid;
use tracing::{debug, instrument, trace};

use crate::book::{Book, OrderBookSnapshot};
use crate::config::SymbolConfig;
use crate::decimal::is_multiple_of;
use crate::error::{VenueError, VenueResult};
use crate::order::{Order, Side};
use crate::trade::{Fill, FillRole, Trade};
use crate::utils::now;

/// Everything the engine mutates, behind one mutex so that direct callers
/// (tests, tooling) see a consistent book without going through the
/// coordinator.
#[derive(Default)]
struct EngineState {
    book: Book,
    completed: HashMap<Uuid, Order>,
    trade_log: Vec<Trade>,
}

/// The price-time priority matching engine for one symbol.
///
/// Admission validates the order against the symbol's tick/size rules,
/// then runs the crossing loop described in `SPEC_FULL.md` §4: repeatedly
/// cross against the opposite side's best order until either the book
/// empties, the cross predicate fails, or the incoming order is fully
/// filled.
pub struct MatchingEngine {
    config: SymbolConfig,
    state: Mutex<EngineState>,
}

impl MatchingEngine {
    /// A fresh, empty engine for `config`.
    pub fn new(config: SymbolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(EngineState::default()),
        }
    }

    /// The symbol this engine matches.
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Validate `order` against this symbol's tick/size rules without
    /// mutating any state. Exposed so the coordinator can check an order
    /// *before* reserving ledger balance against it, keeping the "no
    /// partial mutation on rejection" guarantee even though reservation
    /// and admission are two separate steps.
    pub(crate) fn validate(&self, order: &Order) -> VenueResult<()> {
        if order.size < self.config.min_size {
            return Err(VenueError::OrderTooSmall {
                size: order.size,
                min_size: self.config.min_size,
            });
        }
        if !is_multiple_of(order.size, self.config.size_tick) {
            return Err(VenueError::InvalidSizePrecision {
                size: order.size,
                size_tick: self.config.size_tick,
            });
        }
        if !is_multiple_of(order.price, self.config.price_tick) {
            return Err(VenueError::InvalidPricePrecision {
                price: order.price,
                price_tick: self.config.price_tick,
            });
        }
        Ok(())
    }

    /// Admit a limit order, running it through the crossing loop.
    ///
    /// Validation happens before any state is touched (rejection is
    /// atomic, per `SPEC_FULL.md` OQ4: this core *does* call the
    /// validation it defines, unlike the platform it was distilled from).
    /// Returns the admitted order (with its own fills applied) and the
    /// full list of `(role, trade)` legs produced, taker legs and maker
    /// legs interleaved in the order they occurred.
    #[instrument(skip(self, order), fields(symbol = %self.config.symbol, order_id = %order.order_id))]
    pub fn add_limit_order(&self, mut order: Order) -> VenueResult<(Order, Vec<Fill>)> {
        self.validate(&order)?;

        let taker_side = order.side;
        let maker_side = taker_side.opposite();
        let mut fills = Vec::new();

        let mut state = self.state.lock().unwrap();

        loop {
            let Some(mut maker) = state.book.best(maker_side) else {
                state.book.insert(order.clone());
                trace!(order_id = %order.order_id, "rested, no opposite liquidity");
                return Ok((order, fills));
            };

            let crosses = taker_side.scale(order.price) >= taker_side.scale(maker.price);
            if !crosses {
                state.book.insert(order.clone());
                trace!(order_id = %order.order_id, maker_price = %maker.price, "rested, does not cross");
                return Ok((order, fills));
            }

            let amount = order.remaining().min(maker.remaining());
            let trade = Trade {
                trade_id: Uuid::new_v4(),
                price: maker.price,
                amount,
                timestamp: order.create_time,
            };

            order.push_trade(trade);
            maker.push_trade(trade);
            state.trade_log.push(trade);

            fills.push(Fill {
                role: FillRole::Taker,
                order_id: order.order_id,
                user_id: order.user_id.clone(),
                side: order.side,
                trade,
            });
            fills.push(Fill {
                role: FillRole::Maker,
                order_id: maker.order_id,
                user_id: maker.user_id.clone(),
                side: maker.side,
                trade,
            });

            trace!(
                trade_id = %trade.trade_id,
                price = %trade.price,
                amount = %trade.amount,
                maker_id = %maker.order_id,
                "crossed"
            );

            if maker.completed() {
                state.book.remove(maker.order_id);
                state.completed.insert(maker.order_id, maker);
            } else {
                state.book.update(maker);
            }

            if order.completed() {
                state.completed.insert(order.order_id, order.clone());
                return Ok((order, fills));
            }
        }
    }

    /// Look up an order (open or completed) by id.
    #[instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub fn order_status(&self, order_id: Uuid) -> VenueResult<Order> {
        let state = self.state.lock().unwrap();
        state
            .book
            .get(order_id)
            .or_else(|| state.completed.get(&order_id).cloned())
            .ok_or(VenueError::OrderNotFound { order_id })
    }

    /// Cancel a resting order. Errors if it is already canceled, already
    /// completed, or unknown.
    #[instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub fn cancel_order(&self, order_id: Uuid) -> VenueResult<Order> {
        let mut state = self.state.lock().unwrap();
        if let Some(mut order) = state.book.remove(order_id) {
            order.cancel(now());
            state.completed.insert(order_id, order.clone());
            debug!(order_id = %order_id, "canceled");
            return Ok(order);
        }

        match state.completed.get(&order_id) {
            Some(order) if order.is_canceled() => {
                Err(VenueError::OrderAlreadyCanceled { order_id })
            }
            Some(_) => Err(VenueError::OrderAlreadyCompleted { order_id }),
            None => Err(VenueError::OrderNotFound { order_id }),
        }
    }

    /// Cancel every open order matching `user_id` (all open orders if
    /// `user_id` is `None`). Iterates a stable snapshot of open orders so
    /// that cancellation never observes its own mutation mid-scan.
    #[instrument(skip(self), fields(symbol = %self.config.symbol))]
    pub fn cancel_all(&self, user_id: Option<&str>) -> Vec<Order> {
        let candidate_ids = {
            let state = self.state.lock().unwrap();
            state.book.open_order_ids()
        };

        let mut canceled = Vec::new();
        for order_id in candidate_ids {
            let matches = {
                let state = self.state.lock().unwrap();
                match state.book.get(order_id) {
                    Some(order) => match user_id {
                        Some(uid) => order.user_id.as_deref() == Some(uid),
                        None => true,
                    },
                    None => false,
                }
            };
            if matches {
                if let Ok(order) = self.cancel_order(order_id) {
                    canceled.push(order);
                }
            }
        }
        canceled
    }

    /// A fresh, value-typed snapshot of the current book.
    pub fn order_book(&self) -> OrderBookSnapshot {
        let state = self.state.lock().unwrap();
        state.book.snapshot(&self.config.symbol, now())
    }
}
