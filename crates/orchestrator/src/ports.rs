//! Ports - The narrow interfaces the orchestrator drives
//!
//! ```text
//! Orchestrator           │  Adapters
//! ───────────────────────┼──────────────────────────────
//! BackendRegistry        │  InMemoryBackendRegistry
//!   └─ ChainBackend      │  SimulatedChain, RPC clients
//! TargetProvisioner      │  Create3Provisioner (inbox, outbox)
//! SetupTask              │  DeployDevApp, FundSolver, ...
//! ```
//!
//! Every provisioner and setup task must be idempotent: running it against
//! a chain where its effect is already in place is a successful no-op.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{BackendError, NotFoundError, SetupError};
use solve_domain::{Address, ArtifactKind, ArtifactRef, ChainId, NetworkId};

/// Confirmation of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub chain: ChainId,
    pub block: u64,
    pub tx_hash: String,
}

/// Connection handle bound to one chain
///
/// Every call suspends until the transaction is confirmed or fails.
/// Deadlines are the implementation's concern.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Chain this handle submits to
    fn chain_id(&self) -> ChainId;

    /// Code deployed at `address`, `None` if empty
    async fn code_at(&self, address: Address) -> Result<Option<Vec<u8>>, BackendError>;

    /// Place `code` at its deterministic `address` through the deployer factory
    async fn deploy(&self, address: Address, code: Vec<u8>) -> Result<TxReceipt, BackendError>;

    /// Whether `caller` may make calls through `contract`
    async fn is_allowed(&self, contract: Address, caller: Address) -> Result<bool, BackendError>;

    /// Grant `caller` permission on `contract`
    async fn allow(&self, contract: Address, caller: Address) -> Result<TxReceipt, BackendError>;

    async fn balance(&self, account: Address) -> Result<u128, BackendError>;

    /// Send `amount` from the sender to `to`
    async fn transfer(&self, to: Address, amount: u128) -> Result<TxReceipt, BackendError>;
}

/// Read-only lookup of connection handles by chain
pub trait BackendRegistry: Send + Sync {
    fn resolve(&self, chain: ChainId) -> Result<Arc<dyn ChainBackend>, NotFoundError>;

    /// Every chain this registry serves, in a stable order
    fn chain_ids(&self) -> Vec<ChainId>;
}

/// Ensures one artifact exists on one chain
#[async_trait]
pub trait TargetProvisioner: Send + Sync {
    /// The artifact this provisioner is responsible for
    fn kind(&self) -> ArtifactKind;

    /// Create the artifact at its canonical location unless it is already there
    ///
    /// The canonical location depends only on `(network, kind)`.
    async fn ensure_deployed(
        &self,
        network: &NetworkId,
        backend: &dyn ChainBackend,
    ) -> Result<ArtifactRef, BackendError>;
}

/// One cross-cutting setup action run after all artifacts exist
#[async_trait]
pub trait SetupTask: Send + Sync {
    /// Label used in logs and failures
    fn name(&self) -> &str;

    /// Whether re-running the task is a guaranteed no-op
    ///
    /// Tasks returning `false` are flagged with a warning before they run.
    fn is_idempotent(&self) -> bool {
        true
    }

    /// Apply the task on every chain of `backends`
    ///
    /// The orchestrator passes a view limited to the network's chains.
    async fn run(
        &self,
        network: &NetworkId,
        backends: &dyn BackendRegistry,
    ) -> Result<(), SetupError>;
}
