//! solve-provision run command
//!
//! Provisions a manifest's network against simulated chains. Running more
//! than once shows the later runs finding everything in place.

use anyhow::{bail, Context};
use clap::Args;
use orchestrator::{BackendRegistry, ProvisionOutcome};
use shared::NetworkManifest;
use solve_adapter::deploy::derive_address;
use solve_adapter::{
    standard_orchestrator, InMemoryBackendRegistry, SimulatedChain, SolverSettings,
};
use solve_domain::Network;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 1000 ether, in wei
const DEFAULT_DEPLOYER_BALANCE: u128 = 1_000_000_000_000_000_000_000;

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Network manifest (.json, .yaml or .yml)
    pub manifest: PathBuf,

    /// Provision this many times in a row
    #[arg(long, default_value_t = 1)]
    pub runs: u32,

    /// Leave a chain (name or id) out of the backend registry
    #[arg(long, value_name = "CHAIN")]
    pub unregistered: Option<String>,

    /// Deployer balance on each simulated chain, in wei
    #[arg(long, default_value_t = DEFAULT_DEPLOYER_BALANCE)]
    pub deployer_balance: u128,

    /// Confirmation latency of each simulated transaction, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

impl RunCommand {
    pub async fn run(&self) -> anyhow::Result<()> {
        let manifest = NetworkManifest::from_file(&self.manifest)
            .with_context(|| format!("Failed to load manifest {}", self.manifest.display()))?;
        let network = manifest.to_network()?;
        let settings = SolverSettings::from_manifest(&manifest)?;

        let registry: Arc<dyn BackendRegistry> = Arc::new(self.registry(&network)?);
        let orchestrator = standard_orchestrator(&settings);

        for run in 1..=self.runs {
            info!(run, network = %network.id(), "Provisioning run");
            let outcome = orchestrator
                .provision(&network, registry.clone())
                .await
                .with_context(|| format!("Provisioning run {} of {} failed", run, self.runs))?;
            print_outcome(&network, &outcome);
        }
        Ok(())
    }

    fn registry(&self, network: &Network) -> anyhow::Result<InMemoryBackendRegistry> {
        let deployer = derive_address(network.id(), "deployer");
        let latency = Duration::from_millis(self.latency_ms);
        let mut registry = InMemoryBackendRegistry::new();
        let mut left_out = false;

        for chain in network.chains() {
            if let Some(skip) = &self.unregistered {
                if *skip == chain.name() || *skip == chain.id().to_string() {
                    left_out = true;
                    continue;
                }
            }
            let simulated = SimulatedChain::new(chain.id(), deployer)
                .with_latency(latency)
                .with_balance(deployer, self.deployer_balance);
            registry.register(Arc::new(simulated));
        }

        if let (Some(skip), false) = (&self.unregistered, left_out) {
            bail!("--unregistered {}: no such chain in network {}", skip, network.id());
        }
        Ok(registry)
    }
}

fn print_outcome(network: &Network, outcome: &ProvisionOutcome) {
    match outcome {
        ProvisionOutcome::Skipped => {
            println!("Network {} is not ephemeral, nothing to do", network.id());
        }
        ProvisionOutcome::Provisioned { artifacts } => {
            for artifact in artifacts {
                let status = if artifact.was_deployed() { "deployed" } else { "existing" };
                println!(
                    "  {:<12} chain {:<8} {} ({})",
                    artifact.kind(),
                    artifact.chain(),
                    artifact.address(),
                    status
                );
            }
            println!(
                "✓ Network {} ready ({} new, {} existing)",
                network.id(),
                outcome.newly_deployed(),
                artifacts.len() - outcome.newly_deployed()
            );
        }
    }
}
