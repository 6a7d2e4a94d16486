//! # Solve Adapters
//!
//! Concrete implementations of the orchestrator ports.
//!
//! ## Structure
//!
//! - `backend/` - connection handles (simulated chain) and their registry
//! - `deploy` - deterministic addresses and the inbox/outbox provisioners
//! - `setup/` - the Phase 2 tasks (devnet app, solver funding and permissions)

pub mod backend;
pub mod deploy;
pub mod setup;

use std::sync::Arc;

use orchestrator::Orchestrator;
use shared::NetworkManifest;
use solve_domain::{Address, NetworkId};

use crate::deploy::{derive_address, Create3Provisioner};
use crate::setup::{AllowDevAppCalls, AllowSolverTargetCalls, DeployDevApp, FundSolver};

pub use backend::{simulated_registry, InMemoryBackendRegistry, SimulatedChain};

/// Who the solver is and how much it should hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverSettings {
    pub solver: Address,
    /// Contract the solver calls through the outbox
    pub target: Address,
    pub min_balance: u128,
}

impl SolverSettings {
    /// Accounts derived from the network id
    pub fn derived(network: &NetworkId, min_balance: u128) -> Self {
        Self {
            solver: derive_address(network, "solver"),
            target: derive_address(network, "solver-target"),
            min_balance,
        }
    }

    /// Settings from a manifest, falling back to derived accounts
    pub fn from_manifest(manifest: &NetworkManifest) -> shared::Result<Self> {
        let network = NetworkId::new(manifest.network.as_str());
        let mut settings = Self::derived(&network, manifest.solver.min_balance);
        if let Some(solver) = manifest.solver_address()? {
            settings.solver = solver;
        }
        Ok(settings)
    }
}

/// Inbox and outbox on every chain, then the four solve setup tasks
pub fn standard_orchestrator(settings: &SolverSettings) -> Orchestrator {
    Orchestrator::new()
        .with_provisioner(Arc::new(Create3Provisioner::inbox()))
        .with_provisioner(Arc::new(Create3Provisioner::outbox()))
        .with_setup_task(Arc::new(DeployDevApp))
        .with_setup_task(Arc::new(AllowDevAppCalls))
        .with_setup_task(Arc::new(FundSolver::new(settings.solver, settings.min_balance)))
        .with_setup_task(Arc::new(AllowSolverTargetCalls::new(settings.target)))
}
