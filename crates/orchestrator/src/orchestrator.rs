//! Orchestrator - Two-phase provisioning of solve contracts
//!
//! ```text
//! [start] ─eligible?─► deploy boxes ─ok?─► setup targets ─ok?─► [done]
//!    │no                  │no                 │no
//!  skipped            Artifacts(agg)       Setup(agg)
//! ```
//!
//! Phase 1 fans out one task per (chain × provisioner). Phase 2 fans out
//! one task per setup task, and only starts after Phase 1 joined cleanly.
//! Nothing is retried or rolled back here: every leaf is idempotent, so
//! the recovery path for any failure is to run the whole thing again.

use std::sync::Arc;

use shared::{
    AggregateError, ProvisionError, ProvisioningError, ResolutionError, Result, SetupTaskError,
    TaskFailure,
};
use solve_domain::{ArtifactKind, ArtifactRef, Network, NetworkId};
use tracing::{debug, info, warn};

use crate::phase::Phase;
use crate::ports::{BackendRegistry, SetupTask, TargetProvisioner};
use crate::scope::NetworkBackends;

/// Phase 1 name, used in logs and aggregate errors
pub const DEPLOY_PHASE: &str = "deploy boxes";
/// Phase 2 name
pub const SETUP_PHASE: &str = "setup targets";

/// Successful provisioning result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The network is not ephemeral, nothing was touched
    Skipped,
    /// Both phases succeeded
    Provisioned { artifacts: Vec<ArtifactRef> },
}

impl ProvisionOutcome {
    pub fn artifacts(&self) -> &[ArtifactRef] {
        match self {
            ProvisionOutcome::Skipped => &[],
            ProvisionOutcome::Provisioned { artifacts } => artifacts,
        }
    }

    /// Artifacts created by this run (as opposed to found in place)
    pub fn newly_deployed(&self) -> usize {
        self.artifacts().iter().filter(|a| a.was_deployed()).count()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ProvisionOutcome::Skipped)
    }
}

/// What a run would do, without doing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub network: NetworkId,
    pub eligible: bool,
    /// (chain name, artifact) pairs of Phase 1
    pub deployments: Vec<(String, ArtifactKind)>,
    /// Setup task names of Phase 2, with their idempotency flag
    pub setup_tasks: Vec<(String, bool)>,
}

/// The provisioning entry point
#[derive(Clone, Default)]
pub struct Orchestrator {
    provisioners: Vec<Arc<dyn TargetProvisioner>>,
    setup_tasks: Vec<Arc<dyn SetupTask>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact kind provisioned on every chain
    pub fn with_provisioner(mut self, provisioner: Arc<dyn TargetProvisioner>) -> Self {
        self.provisioners.push(provisioner);
        self
    }

    /// Add a Phase 2 setup task
    pub fn with_setup_task(mut self, task: Arc<dyn SetupTask>) -> Self {
        self.setup_tasks.push(task);
        self
    }

    pub fn provisioner_count(&self) -> usize {
        self.provisioners.len()
    }

    pub fn setup_task_count(&self) -> usize {
        self.setup_tasks.len()
    }

    /// Provision `network` using the handles in `backends`
    pub async fn provision(
        &self,
        network: &Network,
        backends: Arc<dyn BackendRegistry>,
    ) -> Result<ProvisionOutcome> {
        if !network.is_eligible() {
            warn!(network = %network.id(), "Skipping solve deploy");
            return Ok(ProvisionOutcome::Skipped);
        }

        info!(
            network = %network.id(),
            chains = network.chains().len(),
            "Deploying solve contracts"
        );

        let artifacts = self
            .deploy_boxes(network, backends.as_ref())
            .await
            .map_err(ProvisionError::Artifacts)?;

        self.setup_targets(network, &backends)
            .await
            .map_err(ProvisionError::Setup)?;

        info!(
            network = %network.id(),
            artifacts = artifacts.len(),
            "Solve contracts ready"
        );
        Ok(ProvisionOutcome::Provisioned { artifacts })
    }

    /// Phase 1: every provisioner on every chain, concurrently
    async fn deploy_boxes(
        &self,
        network: &Network,
        backends: &dyn BackendRegistry,
    ) -> std::result::Result<Vec<ArtifactRef>, AggregateError> {
        let mut phase = Phase::new(DEPLOY_PHASE);

        for chain in network.chains() {
            let backend = match backends.resolve(chain.id()) {
                Ok(backend) => backend,
                Err(source) => {
                    phase.record_failure(
                        ResolutionError {
                            chain_name: chain.name().to_string(),
                            source,
                        }
                        .into(),
                    );
                    continue;
                }
            };

            for provisioner in &self.provisioners {
                let provisioner = Arc::clone(provisioner);
                let backend = Arc::clone(&backend);
                let network_id = network.id().clone();
                let chain_name = chain.name().to_string();

                phase.spawn(chain.name(), async move {
                    let kind = provisioner.kind();
                    let artifact = provisioner
                        .ensure_deployed(&network_id, backend.as_ref())
                        .await
                        .map_err(|source| {
                            TaskFailure::from(ProvisioningError {
                                chain_name: chain_name.clone(),
                                kind,
                                source,
                            })
                        })?;

                    debug!(
                        addr = %artifact.address(),
                        chain = %chain_name,
                        existing = !artifact.was_deployed(),
                        "{} deployed",
                        kind
                    );
                    Ok::<_, TaskFailure>(artifact)
                });
            }
        }

        info!(phase = DEPLOY_PHASE, tasks = phase.len(), "Phase started");
        phase.join().await
    }

    /// Phase 2: every setup task, concurrently
    async fn setup_targets(
        &self,
        network: &Network,
        backends: &Arc<dyn BackendRegistry>,
    ) -> std::result::Result<(), AggregateError> {
        for task in self.setup_tasks.iter().filter(|t| !t.is_idempotent()) {
            warn!(
                task = task.name(),
                "Setup task is not idempotent, re-running provisioning may repeat its effects"
            );
        }

        let scoped: Arc<dyn BackendRegistry> =
            Arc::new(NetworkBackends::new(network, Arc::clone(backends)));

        let mut phase = Phase::new(SETUP_PHASE);
        for task in &self.setup_tasks {
            let task = Arc::clone(task);
            let backends = Arc::clone(&scoped);
            let network_id = network.id().clone();
            let name = task.name().to_string();

            phase.spawn(name.clone(), async move {
                task.run(&network_id, backends.as_ref())
                    .await
                    .map_err(|source| TaskFailure::from(SetupTaskError { task: name, source }))?;
                Ok::<_, TaskFailure>(())
            });
        }

        info!(phase = SETUP_PHASE, tasks = phase.len(), "Phase started");
        phase.join().await.map(|_| ())
    }

    /// Describe both phases for `network` without touching any chain
    pub fn plan(&self, network: &Network) -> Plan {
        let deployments = network
            .chains()
            .iter()
            .flat_map(|chain| {
                self.provisioners
                    .iter()
                    .map(move |p| (chain.name().to_string(), p.kind()))
            })
            .collect();

        let setup_tasks = self
            .setup_tasks
            .iter()
            .map(|t| (t.name().to_string(), t.is_idempotent()))
            .collect();

        Plan {
            network: network.id().clone(),
            eligible: network.is_eligible(),
            deployments,
            setup_tasks,
        }
    }
}
