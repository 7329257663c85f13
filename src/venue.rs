//! The venue coordinator: dispatch by symbol, serializes admission and
//! settlement (C6).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::book::OrderBookSnapshot;
use crate::config::PlatformConfig;
use crate::error::{VenueError, VenueResult};
use crate::ledger::{BalanceData, Ledger};
use crate::matching::MatchingEngine;
use crate::order::{Order, OrderType, Side};
use crate::utils::now;

/// An order submission. `order_id`, `create_time` and the admission
/// sequence are assigned by [`Venue::add_order`] inside its critical
/// section, not by the caller — see `SPEC_FULL.md` OQ3: the source
/// platform let the caller stamp `create_time`, which admits unfair
/// interleaving under concurrent submission; here the coordinator stamps
/// it itself so that admission order and `create_time` order always
/// agree.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The symbol to trade.
    pub symbol: String,
    /// `None` for an anonymous/house order.
    pub user_id: Option<String>,
    /// Buy or sell.
    pub side: Side,
    /// The order type (only `LimitOrder` is accepted by this core).
    pub order_type: OrderType,
    /// The order's size. Must be `> 0` and on the symbol's size tick.
    pub size: Decimal,
    /// The limit price. Must be `> 0` and on the symbol's price tick.
    pub price: Decimal,
    /// An optional free-form correlation label, carried through to the
    /// admitted `Order` unchanged.
    pub order_tag: Option<String>,
}

impl NewOrder {
    /// A limit order submission with no tag and an anonymous (house) user.
    pub fn limit(symbol: impl Into<String>, side: Side, size: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            user_id: None,
            side,
            order_type: OrderType::LimitOrder,
            size,
            price,
            order_tag: None,
        }
    }

    /// Attach a user id to this submission.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// The venue: holds every per-symbol matching engine and the balance
/// ledger, and is the only thing external callers talk to.
///
/// `add_order` holds one global mutex across reserve -> match -> settle,
/// per the locking discipline in `SPEC_FULL.md` §5: this coordinator
/// mutex is always the outer lock; it is held while calling into a single
/// engine's own (inner) mutex, and no call path ever holds two engines'
/// mutexes, or an engine mutex alone, while touching the ledger.
pub struct Venue {
    config: PlatformConfig,
    ledger: Ledger,
    engines: HashMap<String, MatchingEngine>,
    admission_lock: Mutex<()>,
    order_index: DashMap<Uuid, String>,
    next_sequence: AtomicU64,
}

impl Default for Venue {
    /// A venue using [`PlatformConfig::default`] (the `FOOBAR` catalogue).
    fn default() -> Self {
        Self::new(PlatformConfig::default())
    }
}

impl Venue {
    /// A venue for the given, immutable configuration. `config` is cloned
    /// in, never shared as a process-wide singleton, so that independent
    /// `Venue`s (e.g. in parallel tests) never observe each other.
    pub fn new(config: PlatformConfig) -> Self {
        let engines = config
            .symbol_configs
            .iter()
            .map(|(symbol, symbol_config)| {
                (symbol.clone(), MatchingEngine::new(symbol_config.clone()))
            })
            .collect();

        Self {
            ledger: Ledger::new(config.clone()),
            config,
            engines,
            admission_lock: Mutex::new(()),
            order_index: DashMap::new(),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Submit a new order. Reserves the required balance, runs it
    /// through the symbol's matching engine, and settles every resulting
    /// fill — all under one critical section, so no other `add_order`,
    /// `cancel_order` or `cancel_all_orders` call observes an
    /// intermediate state.
    #[instrument(skip(self, request), fields(symbol = %request.symbol))]
    pub fn add_order(&self, request: NewOrder) -> VenueResult<Order> {
        if request.order_type != OrderType::LimitOrder {
            return Err(VenueError::UnrecognizedOrderType);
        }

        let _guard = self.admission_lock.lock().unwrap();

        let symbol_config = self
            .config
            .symbol_configs
            .get(&request.symbol)
            .ok_or_else(|| VenueError::UnrecognizedSymbol {
                symbol: request.symbol.clone(),
            })?
            .clone();
        let engine = self
            .engines
            .get(&request.symbol)
            .expect("an engine exists for every configured symbol");

        let order = Order {
            order_id: Uuid::new_v4(),
            user_id: request.user_id,
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            size: request.size,
            price: request.price,
            create_time: now(),
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
            order_tag: request.order_tag,
            trades: Vec::new(),
            canceled_at: None,
        };

        // Validate before reserving: a rejection here must leave the
        // ledger untouched, and the engine will re-validate internally
        // for direct-access callers regardless.
        engine.validate(&order)?;

        self.ledger.reserve_asset(
            &order,
            symbol_config.base.as_deref(),
            symbol_config.quote.as_deref(),
        )?;

        let (admitted, fills) = engine.add_limit_order(order)?;
        self.order_index
            .insert(admitted.order_id, request.symbol.clone());

        for fill in &fills {
            self.ledger.settle_fill(
                fill,
                symbol_config.base.as_deref(),
                symbol_config.quote.as_deref(),
            );
        }

        Ok(admitted)
    }

    fn engine_for(&self, symbol: &str) -> VenueResult<&MatchingEngine> {
        self.engines
            .get(symbol)
            .ok_or_else(|| VenueError::UnrecognizedSymbol {
                symbol: symbol.to_string(),
            })
    }

    /// Look up an order by id. If `symbol` is given, only that engine is
    /// searched; otherwise every engine is probed.
    pub fn order_status(&self, order_id: Uuid, symbol: Option<&str>) -> VenueResult<Order> {
        if let Some(symbol) = symbol {
            return self.engine_for(symbol)?.order_status(order_id);
        }
        if let Some(symbol) = self.order_index.get(&order_id) {
            if let Ok(order) = self.engine_for(&symbol)?.order_status(order_id) {
                return Ok(order);
            }
        }
        for engine in self.engines.values() {
            if let Ok(order) = engine.order_status(order_id) {
                return Ok(order);
            }
        }
        Err(VenueError::OrderNotFound { order_id })
    }

    /// Cancel a resting order, releasing its still-reserved remainder
    /// back to `available` (`SPEC_FULL.md` OQ1).
    #[instrument(skip(self))]
    pub fn cancel_order(&self, order_id: Uuid, symbol: Option<&str>) -> VenueResult<Order> {
        let _guard = self.admission_lock.lock().unwrap();

        let symbol = match symbol {
            Some(s) => s.to_string(),
            None => self
                .order_index
                .get(&order_id)
                .map(|s| s.clone())
                .or_else(|| {
                    self.engines
                        .iter()
                        .find(|(_, engine)| engine.order_status(order_id).is_ok())
                        .map(|(symbol, _)| symbol.clone())
                })
                .ok_or(VenueError::OrderNotFound { order_id })?,
        };

        let symbol_config = self.engine_for(&symbol).map(|_| {
            self.config
                .symbol_configs
                .get(&symbol)
                .expect("engine and config are kept in sync")
                .clone()
        })?;

        let canceled = self.engine_for(&symbol)?.cancel_order(order_id)?;
        self.release_cancellation(&canceled, &symbol_config);
        Ok(canceled)
    }

    fn release_cancellation(&self, order: &Order, symbol_config: &crate::config::SymbolConfig) {
        let Some(user_id) = order.user_id.as_deref() else {
            return;
        };
        let remaining = order.remaining();
        if remaining.is_zero() {
            return;
        }
        match order.side {
            Side::Buy => {
                if let Some(quote) = symbol_config.quote.as_deref() {
                    self.ledger
                        .release_reservation(user_id, quote, remaining * order.price);
                }
            }
            Side::Sell => {
                if let Some(base) = symbol_config.base.as_deref() {
                    self.ledger.release_reservation(user_id, base, remaining);
                }
            }
        }
    }

    /// Cancel every open order matching `user_id` (all open orders on
    /// `symbol` if `user_id` is `None`), across one symbol or every
    /// configured symbol.
    pub fn cancel_all_orders(&self, symbol: Option<&str>, user_id: Option<&str>) -> Vec<Order> {
        let _guard = self.admission_lock.lock().unwrap();

        let symbols: Vec<String> = match symbol {
            Some(s) => vec![s.to_string()],
            None => self.engines.keys().cloned().collect(),
        };

        let mut canceled = Vec::new();
        for symbol in symbols {
            let Some(engine) = self.engines.get(&symbol) else {
                continue;
            };
            let Some(symbol_config) = self.config.symbol_configs.get(&symbol) else {
                continue;
            };
            for order in engine.cancel_all(user_id) {
                self.release_cancellation(&order, symbol_config);
                canceled.push(order);
            }
        }
        canceled
    }

    /// A fresh snapshot of `symbol`'s order book.
    pub fn order_book(&self, symbol: &str) -> VenueResult<OrderBookSnapshot> {
        Ok(self.engine_for(symbol)?.order_book())
    }

    /// A snapshot of `user_id`'s balances, or the default template if
    /// `user_id` is `None`.
    pub fn balance(&self, user_id: Option<&str>) -> BalanceData {
        self.ledger.balance(user_id)
    }
}
