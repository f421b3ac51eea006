//! The canonical, hashable `Order` tuple and its domain-separated hash
//! (spec §3, §6). Shared between [`crate::book`] (which validates and
//! matches against it) and [`crate::gateway`] (which hashes, signs, and
//! routes it) so the two components agree on exactly one encoding.

use crate::types::{AssetId, BookId, OrderHash, Quote, Side, UserId};
use sha3::{Digest, Keccak256};

/// A signed limit order, before acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Order owner; funds are locked from and settled into this account.
    pub maker: UserId,
    /// Base-side asset of the pair.
    pub base_asset: AssetId,
    /// Quote-side asset of the pair.
    pub quote_asset: AssetId,
    /// The book this order is scoped to; included in the hash so the same
    /// tuple on two books never collides (spec §9).
    pub book_address: BookId,
    /// Base units offered/requested, > 0.
    pub base_amount: u64,
    /// Quote-per-base price, scaled by `PRICE_SCALE`, tick-aligned.
    pub price: Quote,
    /// Direction.
    pub side: Side,
    /// `0` = never expires; otherwise epoch seconds.
    pub expiry: u64,
    /// Per-maker monotonic sequence number (spec §4.6).
    pub nonce: u64,
}

/// Identifies the signing domain: which gateway, on which chain/system,
/// running which protocol version. Included in every hash so orders
/// signed for one deployment cannot replay on another (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSeparator {
    /// Protocol name, e.g. `"clob"`.
    pub name: &'static str,
    /// Protocol version, e.g. `1`.
    pub version: u32,
    /// Chain or system identifier.
    pub chain_id: u64,
    /// Identity of the gateway instance issuing the domain.
    pub gateway: UserId,
}

fn write_u256_be(out: &mut Vec<u8>, v: Quote) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Compute the canonical, domain-separated hash of `order`.
///
/// Concatenates fields in the fixed order specified (`maker, base_asset,
/// quote_asset, book, base_amount(u64), price(u256), side(bool),
/// expiry(u256), nonce(u256)`), prefixed by the domain separator, and
/// hashes with Keccak-256 — the same style of domain separation the
/// `alloy-sol-types`/EVM ecosystem uses for typed-data signing, which is
/// also the ecosystem `k256`'s ECDSA recovery (see
/// [`crate::gateway::signature`]) is drawn from.
#[must_use]
pub fn hash_order(order: &Order, domain: &DomainSeparator) -> OrderHash {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(domain.name.as_bytes());
    buf.extend_from_slice(&domain.version.to_be_bytes());
    buf.extend_from_slice(&domain.chain_id.to_be_bytes());
    buf.extend_from_slice(domain.gateway.as_bytes());

    buf.extend_from_slice(order.maker.as_bytes());
    buf.extend_from_slice(order.base_asset.as_bytes());
    buf.extend_from_slice(order.quote_asset.as_bytes());
    buf.extend_from_slice(order.book_address.as_bytes());
    buf.extend_from_slice(&order.base_amount.to_be_bytes());
    write_u256_be(&mut buf, order.price);
    buf.push(match order.side {
        Side::BuyBase => 1,
        Side::SellBase => 0,
    });
    buf.extend_from_slice(&(order.expiry as u128).to_be_bytes());
    buf.extend_from_slice(&(order.nonce as u128).to_be_bytes());

    let digest = Keccak256::digest(&buf);
    OrderHash::from_slice(&digest).expect("keccak256 digest is 32 bytes")
}
