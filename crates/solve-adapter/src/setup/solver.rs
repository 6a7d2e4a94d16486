//! Solver setup - Funding and outbox permissions for the solver

use async_trait::async_trait;
use orchestrator::{BackendRegistry, SetupTask};
use shared::SetupError;
use solve_domain::{Address, ArtifactKind, NetworkId};
use tracing::{debug, info};

use crate::deploy::canonical_address;
use crate::setup::all_backends;

/// Top the solver up to a minimum balance on every chain
#[derive(Debug, Clone, Copy)]
pub struct FundSolver {
    solver: Address,
    min_balance: u128,
}

impl FundSolver {
    pub fn new(solver: Address, min_balance: u128) -> Self {
        Self {
            solver,
            min_balance,
        }
    }
}

#[async_trait]
impl SetupTask for FundSolver {
    fn name(&self) -> &str {
        "fund solver"
    }

    async fn run(
        &self,
        _network: &NetworkId,
        backends: &dyn BackendRegistry,
    ) -> Result<(), SetupError> {
        for backend in all_backends(backends)? {
            let balance = backend.balance(self.solver).await?;
            if balance >= self.min_balance {
                debug!(chain = %backend.chain_id(), balance = %balance, "Solver already funded");
                continue;
            }

            let amount = self.min_balance - balance;
            backend.transfer(self.solver, amount).await?;
            info!(
                chain = %backend.chain_id(),
                solver = %self.solver,
                amount = %amount,
                "Funded solver"
            );
        }
        Ok(())
    }
}

/// Allow outbox calls to the solver's target contract
#[derive(Debug, Clone, Copy)]
pub struct AllowSolverTargetCalls {
    target: Address,
}

impl AllowSolverTargetCalls {
    pub fn new(target: Address) -> Self {
        Self { target }
    }
}

#[async_trait]
impl SetupTask for AllowSolverTargetCalls {
    fn name(&self) -> &str {
        "solver allow outbox calls"
    }

    async fn run(
        &self,
        network: &NetworkId,
        backends: &dyn BackendRegistry,
    ) -> Result<(), SetupError> {
        let outbox = canonical_address(network, ArtifactKind::SolveOutbox);

        for backend in all_backends(backends)? {
            if backend.is_allowed(outbox, self.target).await? {
                continue;
            }
            backend.allow(outbox, self.target).await?;
            debug!(
                chain = %backend.chain_id(),
                target = %self.target,
                "Outbox calls allowed for solver target"
            );
        }
        Ok(())
    }
}
