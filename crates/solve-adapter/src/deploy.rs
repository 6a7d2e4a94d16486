//! Deterministic deployment of solve contracts
//!
//! Every artifact lives at an address derived from `(network, salt)` only,
//! so the same contract has the same address on every chain of a network
//! and across every provisioning run, whichever process runs it.

use async_trait::async_trait;
use orchestrator::{ChainBackend, TargetProvisioner};
use sha2::{Digest, Sha256};
use shared::BackendError;
use solve_domain::{Address, ArtifactKind, ArtifactRef, NetworkId};
use tracing::debug;

/// Address derived from a network and a salt
pub fn derive_address(network: &NetworkId, salt: &str) -> Address {
    let digest = Sha256::new()
        .chain_update(network.as_str().as_bytes())
        .chain_update(b"/")
        .chain_update(salt.as_bytes())
        .finalize();

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

/// Canonical address of an artifact on `network`
pub fn canonical_address(network: &NetworkId, kind: ArtifactKind) -> Address {
    derive_address(network, kind.salt())
}

/// Creation code for an artifact
pub fn init_code(kind: ArtifactKind) -> Vec<u8> {
    format!("{}@v1", kind.name()).into_bytes()
}

/// Deploy `kind` at its canonical address unless code is already there
pub async fn deploy_if_needed(
    network: &NetworkId,
    kind: ArtifactKind,
    backend: &dyn ChainBackend,
) -> Result<ArtifactRef, BackendError> {
    let address = canonical_address(network, kind);
    let chain = backend.chain_id();

    if backend.code_at(address).await?.is_some() {
        return Ok(ArtifactRef::existing(kind, chain, address));
    }

    let receipt = backend.deploy(address, init_code(kind)).await?;
    debug!(%address, %chain, block = receipt.block, tx = %receipt.tx_hash, "{} created", kind);
    Ok(ArtifactRef::deployed(kind, chain, address))
}

/// Target provisioner for one artifact kind
#[derive(Debug, Clone, Copy)]
pub struct Create3Provisioner {
    kind: ArtifactKind,
}

impl Create3Provisioner {
    pub fn new(kind: ArtifactKind) -> Self {
        Self { kind }
    }

    pub fn inbox() -> Self {
        Self::new(ArtifactKind::SolveInbox)
    }

    pub fn outbox() -> Self {
        Self::new(ArtifactKind::SolveOutbox)
    }
}

#[async_trait]
impl TargetProvisioner for Create3Provisioner {
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    async fn ensure_deployed(
        &self,
        network: &NetworkId,
        backend: &dyn ChainBackend,
    ) -> Result<ArtifactRef, BackendError> {
        deploy_if_needed(network, self.kind, backend).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SimulatedChain;
    use solve_domain::{ChainId, DeployStatus};

    fn devnet() -> NetworkId {
        NetworkId::new("devnet")
    }

    #[test]
    fn test_address_depends_on_network_and_kind_only() {
        let inbox = canonical_address(&devnet(), ArtifactKind::SolveInbox);

        assert_eq!(inbox, canonical_address(&devnet(), ArtifactKind::SolveInbox));
        assert_ne!(inbox, canonical_address(&devnet(), ArtifactKind::SolveOutbox));
        assert_ne!(
            inbox,
            canonical_address(&NetworkId::new("staging"), ArtifactKind::SolveInbox)
        );
        assert!(!inbox.is_zero());
    }

    #[tokio::test]
    async fn test_ensure_deployed_is_idempotent() {
        let chain = SimulatedChain::new(ChainId::new(1), Address::new([0xd0; 20]));
        let provisioner = Create3Provisioner::inbox();

        let first = provisioner.ensure_deployed(&devnet(), &chain).await.unwrap();
        let second = provisioner.ensure_deployed(&devnet(), &chain).await.unwrap();

        assert_eq!(first.status(), DeployStatus::Deployed);
        assert_eq!(second.status(), DeployStatus::AlreadyDeployed);
        assert!(first.same_location(&second));
        assert_eq!(chain.transactions(), 1);
        assert_eq!(chain.contract_count(), 1);
    }

    #[tokio::test]
    async fn test_same_address_on_every_chain() {
        let provisioner = Create3Provisioner::outbox();
        let alpha = SimulatedChain::new(ChainId::new(1), Address::new([0xd0; 20]));
        let beta = SimulatedChain::new(ChainId::new(2), Address::new([0xd0; 20]));

        let on_alpha = provisioner.ensure_deployed(&devnet(), &alpha).await.unwrap();
        let on_beta = provisioner.ensure_deployed(&devnet(), &beta).await.unwrap();

        assert_eq!(on_alpha.address(), on_beta.address());
        assert_eq!(on_beta.chain(), ChainId::new(2));
    }

    #[tokio::test]
    async fn test_submission_failure_propagates_unchanged() {
        let chain = SimulatedChain::new(ChainId::new(1), Address::new([0xd0; 20]));
        let fault = BackendError::Transport("dial tcp: connection refused".to_string());
        chain.set_fault(Some(fault.clone())).unwrap();

        let err = Create3Provisioner::inbox()
            .ensure_deployed(&devnet(), &chain)
            .await
            .unwrap_err();
        assert_eq!(err, fault);
    }
}
