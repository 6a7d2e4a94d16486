//! Artifact - An on-chain contract instance that later setup steps rely on
//!
//! ArtifactRef is a Value Object: the same kind at the same address on the
//! same chain is the same artifact, however many times it was looked up.

use core::fmt;

use crate::model::address::Address;
use crate::model::chain::ChainId;

/// The kind of artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Inbound side of solve: accepts orders
    SolveInbox,
    /// Outbound side of solve: fills orders and relays calls
    SolveOutbox,
    /// Sample application used on devnets
    DevApp,
}

impl ArtifactKind {
    /// Human-readable contract name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::SolveInbox => "SolveInbox",
            ArtifactKind::SolveOutbox => "SolveOutbox",
            ArtifactKind::DevApp => "DevApp",
        }
    }

    /// Salt from which the canonical address is derived
    ///
    /// Changing a salt moves the artifact, so these are fixed forever.
    pub fn salt(&self) -> &'static str {
        match self {
            ArtifactKind::SolveInbox => "solve-inbox",
            ArtifactKind::SolveOutbox => "solve-outbox",
            ArtifactKind::DevApp => "solve-devapp",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the provisioner created the artifact or found it in place
///
/// Both are success; the distinction only matters for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStatus {
    Deployed,
    AlreadyDeployed,
}

/// Where an artifact lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRef {
    kind: ArtifactKind,
    chain: ChainId,
    address: Address,
    status: DeployStatus,
}

impl ArtifactRef {
    pub fn new(kind: ArtifactKind, chain: ChainId, address: Address, status: DeployStatus) -> Self {
        Self {
            kind,
            chain,
            address,
            status,
        }
    }

    /// A freshly deployed artifact
    pub fn deployed(kind: ArtifactKind, chain: ChainId, address: Address) -> Self {
        Self::new(kind, chain, address, DeployStatus::Deployed)
    }

    /// An artifact that was already on chain
    pub fn existing(kind: ArtifactKind, chain: ChainId, address: Address) -> Self {
        Self::new(kind, chain, address, DeployStatus::AlreadyDeployed)
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn status(&self) -> DeployStatus {
        self.status
    }

    pub fn was_deployed(&self) -> bool {
        self.status == DeployStatus::Deployed
    }

    /// Same artifact at the same place, ignoring how it got there
    pub fn same_location(&self, other: &ArtifactRef) -> bool {
        self.kind == other.kind && self.chain == other.chain && self.address == other.address
    }
}
