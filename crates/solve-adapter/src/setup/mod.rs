//! Setup Tasks - Phase 2 actions run once every solve contract exists
//!
//! Each task visits every chain of the registry it is given (the
//! orchestrator limits it to the network's chains) and checks current
//! state before writing, so running it again is a no-op.

pub mod devapp;
pub mod solver;

use std::sync::Arc;

use orchestrator::{BackendRegistry, ChainBackend};
use shared::NotFoundError;

pub use devapp::{AllowDevAppCalls, DeployDevApp};
pub use solver::{AllowSolverTargetCalls, FundSolver};

/// Every handle of the registry, in its chain order
pub(crate) fn all_backends(
    registry: &dyn BackendRegistry,
) -> Result<Vec<Arc<dyn ChainBackend>>, NotFoundError> {
    registry
        .chain_ids()
        .into_iter()
        .map(|chain| registry.resolve(chain))
        .collect()
}
