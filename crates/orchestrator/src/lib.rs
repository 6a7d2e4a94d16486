//! # Solve Orchestrator
//!
//! Provisions solve contracts across every chain of an ephemeral network.
//!
//! - `ports` - the interfaces adapters implement (backends, provisioners, setup tasks)
//! - `phase` - run N tasks concurrently, join them all, aggregate failures
//! - `scope` - registry view limited to one network's chains
//! - `orchestrator` - the two-phase entry point built on top of `phase`

pub mod orchestrator;
pub mod phase;
pub mod ports;
pub mod scope;

pub use orchestrator::{Orchestrator, Plan, ProvisionOutcome, DEPLOY_PHASE, SETUP_PHASE};
pub use phase::Phase;
pub use ports::{BackendRegistry, ChainBackend, SetupTask, TargetProvisioner, TxReceipt};
pub use scope::NetworkBackends;
