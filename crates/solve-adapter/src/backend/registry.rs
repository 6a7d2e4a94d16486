//! In-memory backend registry
//!
//! Filled before provisioning starts, read-only afterwards, so it needs no
//! locking: share it behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use orchestrator::{BackendRegistry, ChainBackend};
use shared::NotFoundError;
use solve_domain::{Address, ChainId, Network};

use crate::backend::simulated::SimulatedChain;

/// Connection handles keyed by chain id
#[derive(Clone, Default)]
pub struct InMemoryBackendRegistry {
    backends: BTreeMap<ChainId, Arc<dyn ChainBackend>>,
}

impl InMemoryBackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under its own chain id, replacing any previous one
    pub fn register(&mut self, backend: Arc<dyn ChainBackend>) {
        self.backends.insert(backend.chain_id(), backend);
    }

    pub fn unregister(&mut self, chain: ChainId) -> Option<Arc<dyn ChainBackend>> {
        self.backends.remove(&chain)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl BackendRegistry for InMemoryBackendRegistry {
    fn resolve(&self, chain: ChainId) -> Result<Arc<dyn ChainBackend>, NotFoundError> {
        self.backends
            .get(&chain)
            .cloned()
            .ok_or(NotFoundError { chain_id: chain })
    }

    fn chain_ids(&self) -> Vec<ChainId> {
        self.backends.keys().copied().collect()
    }
}

/// A simulated chain for every chain of `network`
///
/// `deployer` signs every transaction and starts with `deployer_balance`
/// wei on each chain. The chains are returned too, for inspection.
pub fn simulated_registry(
    network: &Network,
    deployer: Address,
    deployer_balance: u128,
) -> (InMemoryBackendRegistry, Vec<Arc<SimulatedChain>>) {
    let mut registry = InMemoryBackendRegistry::new();
    let mut chains = Vec::with_capacity(network.chains().len());

    for chain in network.chains() {
        let simulated = Arc::new(
            SimulatedChain::new(chain.id(), deployer).with_balance(deployer, deployer_balance),
        );
        registry.register(simulated.clone());
        chains.push(simulated);
    }

    (registry, chains)
}
