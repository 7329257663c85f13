//! The balance ledger: per-user `{available, reserved}` per asset (C5).

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::trace;

use crate::config::PlatformConfig;
use crate::error::{VenueError, VenueResult};
use crate::order::{Order, Side};
use crate::trade::Fill;

/// One asset's available/reserved split for one user.
///
/// `reserved` is locked against an open order: still owned by the user,
/// unavailable for new orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetBalance {
    /// Free to reserve against a new order.
    pub available: Decimal,
    /// Locked against a currently-open order.
    pub reserved: Decimal,
}

impl AssetBalance {
    /// `available + reserved`.
    pub fn total(&self) -> Decimal {
        self.available + self.reserved
    }
}

/// A user's full balance snapshot: asset -> [`AssetBalance`]. A missing
/// key reads as `(0, 0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceData {
    balances: std::collections::HashMap<String, AssetBalance>,
}

impl BalanceData {
    /// The balance for `asset`, or zero if never referenced.
    pub fn get(&self, asset: &str) -> AssetBalance {
        self.balances.get(asset).copied().unwrap_or_default()
    }

    /// Iterate over every asset this user has a non-default entry for.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AssetBalance)> {
        self.balances.iter()
    }
}

/// Per-user mapping asset -> [`AssetBalance`], materialized lazily from
/// the configured default template on first reference (invariant B1:
/// `available >= 0 && reserved >= 0` for every user/asset, always).
pub struct Ledger {
    config: PlatformConfig,
    accounts: DashMap<String, BalanceData>,
}

impl Ledger {
    /// A ledger with no accounts yet materialized; balances appear lazily
    /// per `PlatformConfig::balance_config`.
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            accounts: DashMap::new(),
        }
    }

    fn default_template(&self) -> BalanceData {
        let mut balances = std::collections::HashMap::new();
        if let Some(initial) = self.config.balance_config.get(&None) {
            for (asset, amount) in &initial.balances {
                balances.insert(
                    asset.clone(),
                    AssetBalance {
                        available: *amount,
                        reserved: Decimal::ZERO,
                    },
                );
            }
        }
        BalanceData { balances }
    }

    fn materialize(&self, user_id: &str) -> BalanceData {
        if let Some(initial) = self.config.balance_config.get(&Some(user_id.to_string())) {
            let mut balances = std::collections::HashMap::new();
            for (asset, amount) in &initial.balances {
                balances.insert(
                    asset.clone(),
                    AssetBalance {
                        available: *amount,
                        reserved: Decimal::ZERO,
                    },
                );
            }
            BalanceData { balances }
        } else {
            self.default_template()
        }
    }

    /// A read-only snapshot of `user_id`'s balances (or the default
    /// template if `user_id` is `None`).
    pub fn balance(&self, user_id: Option<&str>) -> BalanceData {
        match user_id {
            None => self.default_template(),
            Some(uid) => self
                .accounts
                .entry(uid.to_string())
                .or_insert_with(|| self.materialize(uid))
                .clone(),
        }
    }

    fn adjust(
        &self,
        user_id: &str,
        asset: &str,
        available_delta: Decimal,
        reserved_delta: Decimal,
    ) {
        let mut entry = self
            .accounts
            .entry(user_id.to_string())
            .or_insert_with(|| self.materialize(user_id));
        let balance = entry.balances.entry(asset.to_string()).or_default();
        balance.available += available_delta;
        balance.reserved += reserved_delta;
        trace!(
            user_id,
            asset,
            available = %balance.available,
            reserved = %balance.reserved,
            "balance adjusted"
        );
    }

    /// Reserve the asset an admitted order locks against: `size * price`
    /// of `quote` for a buy, `size` of `base` for a sell. A no-op for
    /// anonymous (house) orders or for a leg whose asset is unconfigured
    /// (a "phantom" leg). Fails, with no mutation, if available balance
    /// is short.
    pub fn reserve_asset(&self, order: &Order, base: Option<&str>, quote: Option<&str>) -> VenueResult<()> {
        let Some(user_id) = order.user_id.as_deref() else {
            return Ok(());
        };

        let (asset, amount) = match order.side {
            Side::Buy => (quote, order.size * order.price),
            Side::Sell => (base, order.size),
        };
        let Some(asset) = asset else {
            return Ok(());
        };

        let current = self.balance(Some(user_id)).get(asset);
        if current.available < amount {
            return Err(VenueError::InsufficientBalance {
                asset: asset.to_string(),
            });
        }

        self.adjust(user_id, asset, -amount, amount);
        Ok(())
    }

    /// Release `amount` of `asset` back from `reserved` to `available`
    /// (used when a partially-filled order is canceled: see
    /// `SPEC_FULL.md` OQ1).
    pub fn release_reservation(&self, user_id: &str, asset: &str, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.adjust(user_id, asset, amount, -amount);
    }

    /// Apply one settlement leg from the engine's fill list.
    ///
    /// Per `SPEC_FULL.md` OQ2, this is called exactly once per [`Fill`],
    /// never once per underlying trade (a single trade produces a taker
    /// leg and a maker leg, each settled independently here). A no-op for
    /// anonymous (house) orders, which act as an unbounded counterparty.
    /// The settlement rule keys only on `fill.side` (both legs in this
    /// core are always resting, priced orders); `fill.role` carries no
    /// settlement-relevant information and exists for observability.
    pub fn settle_fill(&self, fill: &Fill, base: Option<&str>, quote: Option<&str>) {
        let Some(user_id) = fill.user_id.as_deref() else {
            return;
        };

        let trade = &fill.trade;
        match fill.side {
            Side::Buy => {
                if let Some(base) = base {
                    self.adjust(user_id, base, trade.amount, Decimal::ZERO);
                }
                if let Some(quote) = quote {
                    self.adjust(user_id, quote, Decimal::ZERO, -(trade.amount * trade.price));
                }
            }
            Side::Sell => {
                if let Some(base) = base {
                    self.adjust(user_id, base, Decimal::ZERO, -trade.amount);
                }
                if let Some(quote) = quote {
                    self.adjust(user_id, quote, trade.amount * trade.price, Decimal::ZERO);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderType;
    use rust_decimal_macros::dec;
    use std::time::SystemTime;
    use uuid::Uuid;

    fn order(side: Side, user_id: &str, size: Decimal, price: Decimal) -> Order {
        Order {
            order_id: Uuid::new_v4(),
            user_id: Some(user_id.to_string()),
            symbol: "FOOBAR".into(),
            side,
            order_type: OrderType::LimitOrder,
            size,
            price,
            create_time: SystemTime::now(),
            sequence: 0,
            order_tag: None,
            trades: vec![],
            canceled_at: None,
        }
    }

    #[test]
    fn reserve_on_sell_locks_base_asset() {
        let ledger = Ledger::new(PlatformConfig::default());
        let o = order(Side::Sell, "0", dec!(200), dec!(100));
        ledger.reserve_asset(&o, Some("FOO"), Some("BAR")).unwrap();

        let balance = ledger.balance(Some("0"));
        let default_amount = dec!(1000000000000);
        assert_eq!(balance.get("FOO").available, default_amount - dec!(200));
        assert_eq!(balance.get("FOO").reserved, dec!(200));
        assert_eq!(balance.get("BAR").available, default_amount);
    }

    #[test]
    fn insufficient_balance_rejects_and_does_not_mutate() {
        let config = PlatformConfig::empty().with_balance(
            Some("1".to_string()),
            crate::config::InitialBalance {
                balances: [("BAR".to_string(), Decimal::ZERO)].into_iter().collect(),
            },
        );
        let ledger = Ledger::new(config);
        let o = order(Side::Buy, "1", dec!(1), dec!(1));
        let err = ledger.reserve_asset(&o, Some("FOO"), Some("BAR")).unwrap_err();
        assert_eq!(
            err,
            VenueError::InsufficientBalance {
                asset: "BAR".to_string()
            }
        );
        assert_eq!(ledger.balance(Some("1")).get("BAR").available, Decimal::ZERO);
    }

    #[test]
    fn phantom_leg_with_no_configured_asset_is_skipped() {
        let ledger = Ledger::new(PlatformConfig::default());
        let o = order(Side::Buy, "2", dec!(1), dec!(1));
        ledger.reserve_asset(&o, None, None).unwrap();
        assert_eq!(ledger.balance(Some("2")).get("BAR"), AssetBalance::default());
    }
}
