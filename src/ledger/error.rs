//! Ledger error types.

use crate::types::{AssetId, Quote, UserId};
use std::fmt;

/// Errors that can occur within the [`super::Ledger`].
///
/// Mirrors the shape of `orderbook::error::OrderBookError`: a
/// `#[non_exhaustive]` enum with structured fields and a manual
/// `Display` + `std::error::Error` impl rather than a `thiserror` derive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    /// `free` balance was smaller than the amount requested.
    InsufficientFree {
        /// Account whose balance was insufficient.
        user: UserId,
        /// Asset involved.
        asset: AssetId,
        /// Amount requested.
        requested: Quote,
        /// Amount actually available.
        available: Quote,
    },

    /// `locked` balance was smaller than the amount requested.
    InsufficientLocked {
        /// Account whose balance was insufficient.
        user: UserId,
        /// Asset involved.
        asset: AssetId,
        /// Amount requested.
        requested: Quote,
        /// Amount actually available.
        available: Quote,
    },

    /// The asset is not in the ledger's supported-assets set.
    AssetNotSupported {
        /// The unsupported asset.
        asset: AssetId,
    },

    /// The caller is not an authorised executor for lock/unlock/transfer.
    NotAuthorized {
        /// The caller that attempted the privileged operation.
        caller: UserId,
    },

    /// The ledger is paused; all mutating operations are rejected.
    Paused,

    /// An amount argument was zero where a positive amount is required.
    ZeroAmount,
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientFree {
                user,
                asset,
                requested,
                available,
            } => write!(
                f,
                "insufficient free balance for {user} in {asset}: requested {requested}, available {available}"
            ),
            LedgerError::InsufficientLocked {
                user,
                asset,
                requested,
                available,
            } => write!(
                f,
                "insufficient locked balance for {user} in {asset}: requested {requested}, available {available}"
            ),
            LedgerError::AssetNotSupported { asset } => {
                write!(f, "asset not supported: {asset}")
            }
            LedgerError::NotAuthorized { caller } => {
                write!(f, "caller not authorized as executor: {caller}")
            }
            LedgerError::Paused => write!(f, "ledger is paused"),
            LedgerError::ZeroAmount => write!(f, "amount must be non-zero"),
        }
    }
}

impl std::error::Error for LedgerError {}
