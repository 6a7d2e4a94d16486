//! Network - The environment being provisioned
//!
//! A Network is read-only once built. The eligibility flag is the single
//! gate deciding whether anything gets provisioned at all: only ephemeral
//! (devnet / test) networks are ever touched.

use core::fmt;
use std::collections::HashSet;

use crate::model::chain::{Chain, ChainId};

/// Network identifier, e.g. `devnet`, `staging`, `mainnet`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a local devnet
    pub fn is_devnet(&self) -> bool {
        self.0 == "devnet" || self.0.starts_with("devnet-")
    }

    /// Naming convention for short-lived networks
    ///
    /// Used when a network descriptor does not carry an explicit
    /// eligibility flag.
    pub fn is_ephemeral_by_convention(&self) -> bool {
        self.is_devnet()
            || self.0 == "staging"
            || self.0.starts_with("test")
            || self.0.starts_with("local")
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Errors raised while building a Network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    EmptyId,
    DuplicateChain { id: ChainId },
    EmptyChainName { id: ChainId },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::EmptyId => write!(f, "Network id must not be empty"),
            NetworkError::DuplicateChain { id } => {
                write!(f, "Chain id {} appears more than once", id)
            }
            NetworkError::EmptyChainName { id } => {
                write!(f, "Chain {} has an empty name", id)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

/// A network and the ordered set of chains it spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    id: NetworkId,
    ephemeral: bool,
    chains: Vec<Chain>,
}

impl Network {
    /// Build a network, rejecting duplicate chain ids and unnamed chains
    pub fn new(
        id: impl Into<NetworkId>,
        ephemeral: bool,
        chains: Vec<Chain>,
    ) -> Result<Self, NetworkError> {
        let id = id.into();
        if id.as_str().trim().is_empty() {
            return Err(NetworkError::EmptyId);
        }

        let mut seen = HashSet::with_capacity(chains.len());
        for chain in &chains {
            if !seen.insert(chain.id()) {
                return Err(NetworkError::DuplicateChain { id: chain.id() });
            }
            if chain.name().trim().is_empty() {
                return Err(NetworkError::EmptyChainName { id: chain.id() });
            }
        }

        Ok(Self {
            id,
            ephemeral,
            chains,
        })
    }

    pub fn id(&self) -> &NetworkId {
        &self.id
    }

    /// Eligibility predicate: only ephemeral networks are provisioned
    pub fn is_eligible(&self) -> bool {
        self.ephemeral
    }

    /// Chains in declaration order
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_network_keeps_chain_order() {
        let network = Network::new(
            "testnet-7",
            true,
            vec![Chain::new(2, "beta"), Chain::new(1, "alpha")],
        )
        .unwrap();

        let names: Vec<_> = network.chains().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["beta", "alpha"]);
        assert!(network.is_eligible());
        assert_eq!(network.chain(ChainId::new(1)).unwrap().name(), "alpha");
    }

    #[test]
    fn test_duplicate_chain_rejected() {
        let err = Network::new(
            "devnet",
            true,
            vec![Chain::new(1, "alpha"), Chain::new(1, "alpha-again")],
        )
        .unwrap_err();

        assert_eq!(err, NetworkError::DuplicateChain { id: ChainId::new(1) });
    }

    #[test]
    fn test_empty_names_rejected() {
        assert_eq!(
            Network::new("  ", true, vec![]).unwrap_err(),
            NetworkError::EmptyId
        );
        assert_eq!(
            Network::new("devnet", true, vec![Chain::new(9, "")]).unwrap_err(),
            NetworkError::EmptyChainName { id: ChainId::new(9) }
        );
    }

    #[test]
    fn test_ephemeral_convention() {
        assert!(NetworkId::new("devnet").is_ephemeral_by_convention());
        assert!(NetworkId::new("devnet-2").is_devnet());
        assert!(NetworkId::new("staging").is_ephemeral_by_convention());
        assert!(NetworkId::new("testnet-7").is_ephemeral_by_convention());
        assert!(!NetworkId::new("testnet-7").is_devnet());
        assert!(!NetworkId::new("mainnet").is_ephemeral_by_convention());
        assert!(!NetworkId::new("omega").is_ephemeral_by_convention());
    }
}
