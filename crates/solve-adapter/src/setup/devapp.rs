//! Devnet app - A sample app that routes calls through the solve outbox
//!
//! Only devnets get the app; on other networks both tasks are no-ops.

use async_trait::async_trait;
use orchestrator::{BackendRegistry, SetupTask};
use shared::SetupError;
use solve_domain::{ArtifactKind, NetworkId};
use tracing::debug;

use crate::deploy::{canonical_address, deploy_if_needed};
use crate::setup::all_backends;

/// Deploy the devnet app on every chain
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployDevApp;

#[async_trait]
impl SetupTask for DeployDevApp {
    fn name(&self) -> &str {
        "deploy devapp"
    }

    async fn run(
        &self,
        network: &NetworkId,
        backends: &dyn BackendRegistry,
    ) -> Result<(), SetupError> {
        if !network.is_devnet() {
            debug!(%network, "Not a devnet, skipping devapp deploy");
            return Ok(());
        }

        for backend in all_backends(backends)? {
            let app = deploy_if_needed(network, ArtifactKind::DevApp, backend.as_ref()).await?;
            debug!(
                addr = %app.address(),
                chain = %app.chain(),
                existing = !app.was_deployed(),
                "DevApp deployed"
            );
        }
        Ok(())
    }
}

/// Allow the devnet app to make calls through the outbox
///
/// The app's address is deterministic, so the grant does not need the app
/// to exist yet, only the outbox.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowDevAppCalls;

#[async_trait]
impl SetupTask for AllowDevAppCalls {
    fn name(&self) -> &str {
        "devapp allow outbox calls"
    }

    async fn run(
        &self,
        network: &NetworkId,
        backends: &dyn BackendRegistry,
    ) -> Result<(), SetupError> {
        if !network.is_devnet() {
            return Ok(());
        }

        let outbox = canonical_address(network, ArtifactKind::SolveOutbox);
        let app = canonical_address(network, ArtifactKind::DevApp);

        for backend in all_backends(backends)? {
            if backend.is_allowed(outbox, app).await? {
                continue;
            }
            backend.allow(outbox, app).await?;
            debug!(chain = %backend.chain_id(), %app, "Outbox calls allowed for devapp");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{simulated_registry, SimulatedChain};
    use crate::deploy::Create3Provisioner;
    use orchestrator::{ChainBackend, TargetProvisioner};
    use solve_domain::{Address, Chain, Network};
    use std::sync::Arc;

    async fn with_outboxes(
        network_id: &str,
    ) -> (Network, impl BackendRegistry, Vec<Arc<SimulatedChain>>) {
        let network = Network::new(
            network_id,
            true,
            vec![Chain::new(1, "alpha"), Chain::new(2, "beta")],
        )
        .unwrap();
        let (registry, chains) = simulated_registry(&network, Address::new([0xd0; 20]), 0);
        for chain in &chains {
            Create3Provisioner::outbox()
                .ensure_deployed(network.id(), &**chain)
                .await
                .unwrap();
        }
        (network, registry, chains)
    }

    #[tokio::test]
    async fn test_devapp_deployed_once_per_chain() {
        let (network, registry, chains) = with_outboxes("devnet").await;

        DeployDevApp.run(network.id(), &registry).await.unwrap();
        DeployDevApp.run(network.id(), &registry).await.unwrap();

        let app = canonical_address(network.id(), ArtifactKind::DevApp);
        for chain in &chains {
            assert!(chain.code_at(app).await.unwrap().is_some());
            // outbox + devapp
            assert_eq!(chain.transactions(), 2);
        }
    }

    #[tokio::test]
    async fn test_allow_is_granted_once() {
        let (network, registry, chains) = with_outboxes("devnet").await;

        AllowDevAppCalls.run(network.id(), &registry).await.unwrap();
        AllowDevAppCalls.run(network.id(), &registry).await.unwrap();

        let outbox = canonical_address(network.id(), ArtifactKind::SolveOutbox);
        let app = canonical_address(network.id(), ArtifactKind::DevApp);
        for chain in &chains {
            assert!(chain.is_allowed(outbox, app).await.unwrap());
            assert_eq!(chain.transactions(), 2);
        }
    }

    #[tokio::test]
    async fn test_non_devnet_is_untouched() {
        let (network, registry, chains) = with_outboxes("staging").await;

        DeployDevApp.run(network.id(), &registry).await.unwrap();
        AllowDevAppCalls.run(network.id(), &registry).await.unwrap();

        for chain in &chains {
            assert_eq!(chain.transactions(), 1);
        }
    }

    #[tokio::test]
    async fn test_allow_without_outbox_fails() {
        let network = Network::new("devnet", true, vec![Chain::new(1, "alpha")]).unwrap();
        let (registry, _chains) = simulated_registry(&network, Address::new([0xd0; 20]), 0);

        let err = AllowDevAppCalls.run(network.id(), &registry).await.unwrap_err();
        assert!(matches!(
            err,
            SetupError::Backend(shared::BackendError::Reverted { .. })
        ));
    }
}
