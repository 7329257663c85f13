//! Convenience re-exports of the types most callers need.
//!
//! ```
//! use spot_venue::prelude::*;
//! ```

pub use crate::book::{OrderBookSnapshot, PriceLevel};
pub use crate::config::{InitialBalance, PlatformConfig, SymbolConfig};
pub use crate::error::{VenueError, VenueResult};
pub use crate::ledger::{AssetBalance, BalanceData};
pub use crate::order::{Order, OrderState, OrderType, Side};
pub use crate::trade::{Fill, FillRole, Trade};
pub use crate::venue::{NewOrder, Venue};
