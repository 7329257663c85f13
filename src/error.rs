//! Error types shared by the matching engine, the ledger and the coordinator.

use rust_decimal::Decimal;
use uuid::Uuid;

/// Every error the public API of [`crate::Venue`] can raise.
///
/// A single enum is used across the engine, the ledger and the coordinator
/// so that callers never have to match on more than one error type.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum VenueError {
    /// The order references a symbol the venue has no config for.
    #[error("unrecognized symbol: {symbol}")]
    UnrecognizedSymbol {
        /// The symbol that was not found.
        symbol: String,
    },

    /// The order's type is not supported by this core.
    #[error("unrecognized order type")]
    UnrecognizedOrderType,

    /// The order's side is neither buy nor sell.
    #[error("invalid side")]
    InvalidSide,

    /// The user does not have enough available balance of `asset` to admit
    /// the order.
    #[error("insufficient balance: {asset}")]
    InsufficientBalance {
        /// The asset that was short.
        asset: String,
    },

    /// Order size is below the symbol's configured minimum.
    #[error("order too small: size {size} below minimum {min_size}")]
    OrderTooSmall {
        /// The rejected order's size.
        size: Decimal,
        /// The symbol's configured minimum size.
        min_size: Decimal,
    },

    /// Order size is not an exact multiple of the symbol's size tick.
    #[error("invalid size precision: {size} is not a multiple of {size_tick}")]
    InvalidSizePrecision {
        /// The rejected order's size.
        size: Decimal,
        /// The symbol's configured size tick.
        size_tick: Decimal,
    },

    /// Order price is not an exact multiple of the symbol's price tick.
    #[error("invalid price precision: {price} is not a multiple of {price_tick}")]
    InvalidPricePrecision {
        /// The rejected order's price.
        price: Decimal,
        /// The symbol's configured price tick.
        price_tick: Decimal,
    },

    /// No order with this id is known to the venue (open or completed).
    #[error("order not found: {order_id}")]
    OrderNotFound {
        /// The order id that was looked up.
        order_id: Uuid,
    },

    /// `cancel_order` was called twice on an already-canceled order.
    #[error("order already canceled: {order_id}")]
    OrderAlreadyCanceled {
        /// The order id that was already canceled.
        order_id: Uuid,
    },

    /// `cancel_order` was called on an order that is already fully filled.
    #[error("order already completed: {order_id}")]
    OrderAlreadyCompleted {
        /// The order id that was already completed.
        order_id: Uuid,
    },
}

/// Convenience alias used throughout the crate.
pub type VenueResult<T> = Result<T, VenueError>;
