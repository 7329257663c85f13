//! Immutable configuration surface: symbol catalogue and default balances.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Static metadata for one tradeable symbol.
///
/// `base`/`quote` are optional: a leg with no configured asset is a
/// "phantom" leg and is skipped entirely during settlement (see
/// [`crate::ledger`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolConfig {
    /// The symbol identifier, e.g. `"FOOBAR"`.
    pub symbol: String,
    /// Minimum price increment; all order prices must be exact multiples.
    pub price_tick: Decimal,
    /// Minimum size increment; all order sizes must be exact multiples.
    pub size_tick: Decimal,
    /// Minimum order size; orders below this are rejected.
    pub min_size: Decimal,
    /// The base asset of this symbol, if settlement tracks it.
    pub base: Option<String>,
    /// The quote asset of this symbol, if settlement tracks it.
    pub quote: Option<String>,
}

impl SymbolConfig {
    /// Build a symbol config with identical price/size ticks and that tick
    /// as the minimum size, the common case for a simple venue.
    pub fn new(
        symbol: impl Into<String>,
        tick: Decimal,
        base: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price_tick: tick,
            size_tick: tick,
            min_size: tick,
            base: Some(base.into()),
            quote: Some(quote.into()),
        }
    }
}

/// The initial per-asset balances granted to a user (or the default
/// template used for users with no explicit entry) when first referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialBalance {
    /// asset -> starting `available` balance.
    pub balances: HashMap<String, Decimal>,
}

/// Immutable platform configuration passed to [`crate::Venue`] at
/// construction and never mutated afterward.
///
/// Per the design notes, this is a plain value — clone it into each venue
/// rather than sharing a process-wide singleton, so that tests using
/// different venues never observe each other's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Catalogue of tradeable symbols, keyed by symbol identifier.
    pub symbol_configs: HashMap<String, SymbolConfig>,
    /// Initial balances, keyed by user id. The `None` key supplies the
    /// default template applied to any user id never seen before.
    pub balance_config: HashMap<Option<String>, InitialBalance>,
}

impl Default for PlatformConfig {
    /// The default catalogue: a single `FOOBAR` symbol (base `FOO`, quote
    /// `BAR`) with all ticks at `0.01`, and a generous default balance
    /// template covering `FOO`, `BAR`, `USD` and `BAZQUX`.
    fn default() -> Self {
        let tick = Decimal::new(1, 2); // 0.01
        let mut symbol_configs = HashMap::new();
        symbol_configs.insert(
            "FOOBAR".to_string(),
            SymbolConfig::new("FOOBAR", tick, "FOO", "BAR"),
        );

        let default_amount = Decimal::new(1_000_000_000_000, 0); // 1e12
        let mut balances = HashMap::new();
        for asset in ["FOO", "BAR", "USD", "BAZQUX"] {
            balances.insert(asset.to_string(), default_amount);
        }

        let mut balance_config = HashMap::new();
        balance_config.insert(None, InitialBalance { balances });

        Self {
            symbol_configs,
            balance_config,
        }
    }
}

impl PlatformConfig {
    /// An empty configuration: no symbols, no default balances. Useful as
    /// a builder starting point in tests that want a tightly controlled
    /// catalogue.
    pub fn empty() -> Self {
        Self {
            symbol_configs: HashMap::new(),
            balance_config: HashMap::new(),
        }
    }

    /// Register (or replace) a symbol's config.
    pub fn with_symbol(mut self, config: SymbolConfig) -> Self {
        self.symbol_configs.insert(config.symbol.clone(), config);
        self
    }

    /// Register (or replace) the initial balance template for `user_id`
    /// (`None` sets the default template for unseen users).
    pub fn with_balance(mut self, user_id: Option<String>, balance: InitialBalance) -> Self {
        self.balance_config.insert(user_id, balance);
        self
    }
}
