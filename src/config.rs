//! Exchange-wide configuration, separate from any one book's
//! [`crate::book::PairConfig`] (spec §10.3).

use crate::types::{Quote, UserId, PRICE_SCALE};

/// Parameters that apply across every book a [`crate::gateway::Gateway`]
/// routes into, rather than to one trading pair (spec §6's enumerated
/// configuration surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GatewayConfig {
    /// Identity of this gateway deployment; folded into every order hash's
    /// domain separator so signatures don't replay across gateways.
    pub gateway_id: UserId,
    /// Protocol name folded into the domain separator, e.g. `"clob"`.
    pub domain_name: &'static str,
    /// Protocol version folded into the domain separator.
    pub domain_version: u32,
    /// Chain or system identifier folded into the domain separator.
    pub chain_id: u64,
    /// Fixed-point scale applied to every book's prices.
    pub price_scale: Quote,
    /// Upper bound on any book's tick index.
    pub max_tick_index: u32,
    /// Delay, in seconds, between proposing and executing a sensitive
    /// ledger admin action (reference: 2 days = 172_800).
    pub admin_timelock_delay: u64,
}

impl GatewayConfig {
    /// A config using this crate's compiled-in `PRICE_SCALE` and
    /// `MAX_TICK_INDEX`, and the reference 2-day admin timelock delay.
    #[must_use]
    pub fn with_defaults(gateway_id: UserId, domain_name: &'static str, domain_version: u32, chain_id: u64) -> Self {
        Self {
            gateway_id,
            domain_name,
            domain_version,
            chain_id,
            price_scale: PRICE_SCALE,
            max_tick_index: crate::types::MAX_TICK_INDEX,
            admin_timelock_delay: 172_800,
        }
    }
}

impl GatewayConfig {
    /// The [`crate::order::DomainSeparator`] this configuration implies.
    #[must_use]
    pub fn domain_separator(&self) -> crate::order::DomainSeparator {
        crate::order::DomainSeparator {
            name: self.domain_name,
            version: self.domain_version,
            chain_id: self.chain_id,
            gateway: self.gateway_id,
        }
    }
}
