//! Supported chain allow-list and per-chain deployment metadata.
//!
//! The reference deployment supports exactly two networks. Every token and
//! route operation requires a chain from this set; the controller stays
//! inert otherwise.

use alloy_primitives::{ address, Address };

/// Canonical Multicall3 deployment, same address on every supported chain.
/// https://www.multicall3.com/
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Sentinel address for the chain's native currency (not an ERC-20 contract).
pub const NATIVE_TOKEN_ADDRESS: Address = Address::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Chain {
    Polygon = 137,
    Arbitrum = 42161,
}

impl Chain {
    pub fn from_id(chain_id: u64) -> Option<Chain> {
        match chain_id {
            137 => Some(Chain::Polygon),
            42161 => Some(Chain::Arbitrum),
            _ => None,
        }
    }

    pub fn id(&self) -> u64 {
        *self as u64
    }

    pub fn info(&self) -> &'static ChainInfo {
        match self {
            Chain::Polygon => &POLYGON,
            Chain::Arbitrum => &ARBITRUM,
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.info().name, self.id())
    }
}

/// Static deployment metadata for one supported network.
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub name: &'static str,
    /// Symbol of the native currency, e.g. "MATIC".
    pub currency: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    /// Swap router this app approves and executes against.
    pub router_address: Address,
}

static POLYGON: ChainInfo = ChainInfo {
    name: "Polygon",
    currency: "MATIC",
    rpc_url: "https://polygon-bor-rpc.publicnode.com",
    explorer_url: "https://polygonscan.com",
    router_address: address!("B455B572a2B2ddb1239B2f8b2fF6A74facDac4eB"),
};

static ARBITRUM: ChainInfo = ChainInfo {
    name: "Arbitrum",
    currency: "ETH",
    rpc_url: "https://arbitrum-one-rpc.publicnode.com",
    explorer_url: "https://arbiscan.io",
    router_address: address!("9fA4Ad9CcD081bE5B37Bf0cD91838c1CAf16c283"),
};

/// True iff the chain id is present and a member of the supported set.
pub fn is_supported(chain_id: Option<u64>) -> bool {
    chain_id.is_some_and(|id| Chain::from_id(id).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(is_supported(Some(137)));
        assert!(is_supported(Some(42161)));
        assert!(!is_supported(Some(1)));
        assert!(!is_supported(None));
    }

    #[test]
    fn test_chain_roundtrip() {
        assert_eq!(Chain::from_id(137), Some(Chain::Polygon));
        assert_eq!(Chain::Polygon.id(), 137);
        assert_eq!(Chain::Arbitrum.id(), 42161);
        assert_eq!(Chain::from_id(0), None);
    }

    #[test]
    fn test_chain_metadata() {
        assert_eq!(Chain::Polygon.info().currency, "MATIC");
        assert_eq!(Chain::Arbitrum.info().currency, "ETH");
        assert_ne!(Chain::Polygon.info().router_address, Address::ZERO);
    }
}
