//! Network scope - A registry view limited to one network's chains
//!
//! Callers may hand the orchestrator a registry that also serves other
//! networks. Setup tasks only ever see the chains Phase 1 provisioned.

use std::sync::Arc;

use shared::NotFoundError;
use solve_domain::{ChainId, Network};

use crate::ports::{BackendRegistry, ChainBackend};

/// Backends of `network`'s chains, in network order
pub struct NetworkBackends {
    inner: Arc<dyn BackendRegistry>,
    chains: Vec<ChainId>,
}

impl NetworkBackends {
    pub fn new(network: &Network, inner: Arc<dyn BackendRegistry>) -> Self {
        Self {
            inner,
            chains: network.chains().iter().map(|c| c.id()).collect(),
        }
    }
}

impl BackendRegistry for NetworkBackends {
    fn resolve(&self, chain: ChainId) -> Result<Arc<dyn ChainBackend>, NotFoundError> {
        if !self.chains.contains(&chain) {
            return Err(NotFoundError { chain_id: chain });
        }
        self.inner.resolve(chain)
    }

    fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TxReceipt;
    use async_trait::async_trait;
    use shared::BackendError;
    use solve_domain::{Address, Chain};
    use std::collections::BTreeMap;

    struct Idle(ChainId);

    #[async_trait]
    impl ChainBackend for Idle {
        fn chain_id(&self) -> ChainId {
            self.0
        }

        async fn code_at(&self, _: Address) -> Result<Option<Vec<u8>>, BackendError> {
            Ok(None)
        }

        async fn deploy(&self, _: Address, _: Vec<u8>) -> Result<TxReceipt, BackendError> {
            Err(BackendError::Transport("idle".into()))
        }

        async fn is_allowed(&self, _: Address, _: Address) -> Result<bool, BackendError> {
            Ok(false)
        }

        async fn allow(&self, _: Address, _: Address) -> Result<TxReceipt, BackendError> {
            Err(BackendError::Transport("idle".into()))
        }

        async fn balance(&self, _: Address) -> Result<u128, BackendError> {
            Ok(0)
        }

        async fn transfer(&self, _: Address, _: u128) -> Result<TxReceipt, BackendError> {
            Err(BackendError::Transport("idle".into()))
        }
    }

    struct Everything(BTreeMap<ChainId, Arc<dyn ChainBackend>>);

    impl BackendRegistry for Everything {
        fn resolve(&self, chain: ChainId) -> Result<Arc<dyn ChainBackend>, NotFoundError> {
            self.0.get(&chain).cloned().ok_or(NotFoundError { chain_id: chain })
        }

        fn chain_ids(&self) -> Vec<ChainId> {
            self.0.keys().copied().collect()
        }
    }

    fn registry(ids: &[u64]) -> Arc<dyn BackendRegistry> {
        let backends = ids
            .iter()
            .map(|&id| {
                let chain = ChainId::new(id);
                (chain, Arc::new(Idle(chain)) as Arc<dyn ChainBackend>)
            })
            .collect();
        Arc::new(Everything(backends))
    }

    #[test]
    fn test_only_network_chains_are_visible() {
        let network = Network::new(
            "devnet",
            true,
            vec![Chain::new(3, "gamma"), Chain::new(1, "alpha")],
        )
        .unwrap();
        let scoped = NetworkBackends::new(&network, registry(&[1, 2, 3]));

        assert_eq!(scoped.chain_ids(), vec![ChainId::new(3), ChainId::new(1)]);
        assert!(scoped.resolve(ChainId::new(1)).is_ok());

        let err = scoped.resolve(ChainId::new(2)).err().unwrap();
        assert_eq!(err.chain_id, ChainId::new(2));
    }

    #[test]
    fn test_missing_network_chain_still_not_found() {
        let network = Network::new("devnet", true, vec![Chain::new(7, "eta")]).unwrap();
        let scoped = NetworkBackends::new(&network, registry(&[1]));

        assert_eq!(scoped.chain_ids(), vec![ChainId::new(7)]);
        assert!(scoped.resolve(ChainId::new(7)).is_err());
    }
}
