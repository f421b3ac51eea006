//! ECDSA (secp256k1) signature recovery (spec §4.6).
//!
//! A signature recovers to a 20-byte address the same way an EVM
//! transaction's does: Keccak-256 of the uncompressed public key,
//! last 20 bytes. This is the pattern `k256`+`sha3` are used for
//! throughout the Stylus/`alloy` ecosystem.

use crate::types::{OrderHash, UserId};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// A compact ECDSA signature plus the recovery id needed to recover the
/// signer's public key without already knowing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureBytes {
    /// `r` component, big-endian.
    pub r: [u8; 32],
    /// `s` component, big-endian.
    pub s: [u8; 32],
    /// 0 or 1; selects which of the two candidate points is the signer's.
    pub recovery_id: u8,
}

/// Derive the 20-byte address a public key recovers to.
fn address_from_verifying_key(key: &VerifyingKey) -> Option<UserId> {
    let encoded = key.to_encoded_point(false);
    let bytes = encoded.as_bytes();
    // uncompressed point: 0x04 || X(32) || Y(32); hash X||Y, not the prefix.
    let digest = Keccak256::digest(&bytes[1..]);
    UserId::from_slice(&digest[12..32])
}

/// Recover the signer of `hash` from `signature`, or `None` if the
/// signature is malformed or doesn't recover to a valid point.
#[must_use]
pub fn recover_signer(hash: &OrderHash, signature: &SignatureBytes) -> Option<UserId> {
    let sig = Signature::from_scalars(signature.r, signature.s).ok()?;
    let recid = RecoveryId::from_byte(signature.recovery_id)?;
    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recid).ok()?;
    address_from_verifying_key(&key)
}

/// `true` iff `signature` over `hash` recovers to exactly `expected`.
#[must_use]
pub fn verify(hash: &OrderHash, signature: &SignatureBytes, expected: UserId) -> bool {
    recover_signer(hash, signature) == Some(expected)
}
