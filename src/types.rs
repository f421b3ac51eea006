//! Core scalar and identifier types shared across the ledger, book, and
//! gateway. Prices and amounts are always fixed-point integers — never
//! floating point — per spec §3 and design note §9.

use std::fmt;

/// Base-unit amount. Base amounts fit in 64 bits per spec §3.
pub type Base = u64;

/// Quote-unit amount / price. The reference spec calls for a 256-bit-wide
/// unsigned integer; this crate follows the teacher's own price
/// representation (`u128`, see `orderbook::book::OrderBook::{bids,asks}:
/// SkipMap<u128, _>`) rather than pulling in a bignum crate foreign to its
/// stack. `u128` gives ~38 decimal digits of headroom, comfortably more
/// than `PRICE_SCALE * u64::MAX` requires. See DESIGN.md for the tradeoff.
pub type Quote = u128;

/// Fixed-point scale applied to prices: a price `p` means `p / PRICE_SCALE`
/// quote-per-base.
pub const PRICE_SCALE: Quote = 1_000_000_000_000_000_000; // 10^18

/// Upper bound on a book's tick index, set by the tick-index bitmap's
/// capacity (spec §3, §9).
pub const MAX_TICK_INDEX: u32 = 32767;

/// Which side of the book an order rests on / sweeps against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Taker wants base; rests on the bid side when residual.
    BuyBase,
    /// Taker gives up base; rests on the ask side when residual.
    SellBase,
}

impl Side {
    /// The side a resting order of this kind occupies.
    #[must_use]
    pub fn resting_side(self) -> BookSide {
        match self {
            Side::BuyBase => BookSide::Bid,
            Side::SellBase => BookSide::Ask,
        }
    }

    /// The side this order sweeps against.
    #[must_use]
    pub fn sweep_side(self) -> BookSide {
        self.resting_side().opposite()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BuyBase => write!(f, "buy_base"),
            Side::SellBase => write!(f, "sell_base"),
        }
    }
}

/// Which queue of the book (as opposed to the taker's `Side`) a resting
/// order lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookSide {
    /// Resting buy orders, ordered best (highest tick) first.
    Bid,
    /// Resting sell orders, ordered best (lowest tick) first.
    Ask,
}

impl BookSide {
    /// The other side of the book.
    #[must_use]
    pub fn opposite(self) -> BookSide {
        match self {
            BookSide::Bid => BookSide::Ask,
            BookSide::Ask => BookSide::Bid,
        }
    }
}

impl fmt::Display for BookSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookSide::Bid => write!(f, "bid"),
            BookSide::Ask => write!(f, "ask"),
        }
    }
}

macro_rules! fixed_bytes_id {
    ($name:ident, $len:expr) => {
        /// Fixed-width identifier, displayed as `0x`-prefixed hex.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// The all-zero value, used as a sentinel ("no value") where needed.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Build from a byte slice, padding/truncating is not performed —
            /// the slice must be exactly `$len` bytes.
            #[must_use]
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                if bytes.len() != $len {
                    return None;
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Some(Self(out))
            }

            /// Raw bytes.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex_encode(&self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex_encode(&self.0))
            }
        }
    };
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

fixed_bytes_id!(UserId, 20);
fixed_bytes_id!(AssetId, 20);
fixed_bytes_id!(BookId, 20);
fixed_bytes_id!(OrderHash, 32);

/// Monotonic, book-local order identifier. Used only for queue linkage —
/// identity for hashing/replay purposes is `OrderHash` (spec §9).
pub type OrderSeq = u64;

/// `quote = ceil(base * price / PRICE_SCALE)`. Used for buy-side locking
/// and refunds, so the book never under-reserves quote (spec §3).
#[must_use]
pub fn ceil_quote(base: Base, price: Quote) -> Quote {
    let num = (base as Quote).saturating_mul(price);
    num.div_ceil(PRICE_SCALE)
}

/// `quote = floor(base * price / PRICE_SCALE)`. Used for settlement
/// (spec §3); a fill whose quote floors to zero must be rejected by the
/// caller.
#[must_use]
pub fn floor_quote(base: Base, price: Quote) -> Quote {
    let num = (base as Quote).saturating_mul(price);
    num / PRICE_SCALE
}
