//! Convenience re-export of the crate's most commonly used types.
//!
//! ```rust
//! use clob_core::prelude::*;
//! ```

pub use crate::book::{
    Book, BookError, BookEvent, DepthLevel, OrderDetails, OrderInfo, OrderStatus, PairConfig,
    PlaceResult, PriceLevelInfo, TerminalStatus,
};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::GatewayConfig;
pub use crate::gateway::{Gateway, GatewayError, NonceTracker, PlaceOutcome, SignatureBytes};
pub use crate::ledger::{AdminAction, Ledger, LedgerError, LedgerEvent, Timelock, TimelockError};
pub use crate::order::{hash_order, DomainSeparator, Order};
pub use crate::registry::{Registry, RegistryError};
pub use crate::types::{
    AssetId, Base, BookId, BookSide, OrderHash, OrderSeq, Quote, Side, UserId, PRICE_SCALE,
};
