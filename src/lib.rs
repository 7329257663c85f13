//! # spot-venue
//!
//! A price-time priority limit order matching engine with an integrated
//! account balance ledger.
//!
//! A [`Venue`] owns one [`MatchingEngine`](matching::MatchingEngine) per
//! configured symbol plus a shared [`Ledger`](ledger::Ledger). Submitting
//! an order through [`Venue::add_order`] validates it against its
//! symbol's tick/size rules, reserves the balance it locks, runs it
//! through that symbol's crossing loop, and settles every resulting fill
//! — all under one coordinator-held lock, so callers never observe a
//! reservation without its matching admission, or a fill without its
//! settlement.
//!
//! ```
//! use spot_venue::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let venue = Venue::default();
//! venue
//!     .add_order(NewOrder::limit("FOOBAR", Side::Buy, dec!(10), dec!(100)).for_user("alice"))
//!     .unwrap();
//! let book = venue.order_book("FOOBAR").unwrap();
//! assert_eq!(book.bids.len(), 1);
//! ```

pub mod book;
pub mod config;
pub mod decimal;
pub mod error;
pub mod ledger;
pub mod matching;
pub mod order;
pub mod prelude;
pub mod trade;
mod utils;
pub mod venue;

pub use config::{InitialBalance, PlatformConfig, SymbolConfig};
pub use error::{VenueError, VenueResult};
pub use ledger::{AssetBalance, BalanceData, Ledger};
pub use matching::MatchingEngine;
pub use order::{Order, OrderState, OrderType, Side};
pub use trade::{Fill, FillRole, Trade};
pub use venue::{NewOrder, Venue};
