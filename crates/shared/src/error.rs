//! Error types for solve provisioning
//!
//! Leaf errors (`NotFoundError`, `BackendError`) are wrapped with the chain
//! or task they came from, then collected per phase into an
//! `AggregateError`. Nothing here is ever retried or dropped.

use std::fmt;

use solve_domain::{Address, ArtifactKind, ChainId, NetworkError};
use thiserror::Error;

/// Error thrown when the backend registry has no handle for a chain
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no backend registered for chain {chain_id}")]
pub struct NotFoundError {
    pub chain_id: ChainId,
}

/// Failure while submitting a transaction or waiting for its confirmation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction reverted: {reason}")]
    Reverted { reason: String },

    #[error("insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: u128, required: u128 },

    #[error("{sender} is not authorized to {action}")]
    Unauthorized { sender: Address, action: String },
}

/// A chain of the network could not be resolved to a backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("get backend for chain '{chain_name}'")]
pub struct ResolutionError {
    pub chain_name: String,
    #[source]
    pub source: NotFoundError,
}

/// A target provisioner failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("deploy {kind} on chain '{chain_name}'")]
pub struct ProvisioningError {
    pub chain_name: String,
    pub kind: ArtifactKind,
    #[source]
    pub source: BackendError,
}

/// Why a setup task failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Resolution(#[from] NotFoundError),
}

/// A permission/setup task failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("setup task '{task}'")]
pub struct SetupTaskError {
    pub task: String,
    #[source]
    pub source: SetupError,
}

/// One failed task inside a phase
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskFailure {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Setup(#[from] SetupTaskError),

    /// The task panicked or was aborted before returning
    #[error("task '{label}' did not complete: {reason}")]
    Panicked { label: String, reason: String },
}

impl TaskFailure {
    /// Identifying label: chain name for Phase 1, task name for Phase 2
    pub fn label(&self) -> &str {
        match self {
            TaskFailure::Resolution(e) => &e.chain_name,
            TaskFailure::Provisioning(e) => &e.chain_name,
            TaskFailure::Setup(e) => &e.task,
            TaskFailure::Panicked { label, .. } => label,
        }
    }
}

/// Every failure of one phase, in task submission order
///
/// Never empty: a phase with no failures is a success, not an
/// `AggregateError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    phase: String,
    failures: Vec<TaskFailure>,
}

impl AggregateError {
    /// Returns `None` when there is nothing to aggregate
    pub fn new(phase: impl Into<String>, failures: Vec<TaskFailure>) -> Option<Self> {
        if failures.is_empty() {
            return None;
        }
        Some(Self {
            phase: phase.into(),
            failures,
        })
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    pub fn labels(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether any failure is attributed to `label`
    pub fn mentions(&self, label: &str) -> bool {
        self.failures.iter().any(|f| f.label() == label)
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task(s) failed in {}", self.failures.len(), self.phase)?;
        for failure in &self.failures {
            write!(f, "; [{}] ", failure.label())?;
            write_chain(f, failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Render an error followed by all of its sources
fn write_chain(f: &mut fmt::Formatter<'_>, err: &dyn std::error::Error) -> fmt::Result {
    write!(f, "{}", err)?;
    let mut source = err.source();
    while let Some(cause) = source {
        write!(f, ": {}", cause)?;
        source = cause.source();
    }
    Ok(())
}

/// General provisioning error type
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Phase 1 failed
    #[error("deploy solve boxes")]
    Artifacts(#[source] AggregateError),

    /// Phase 2 failed
    #[error("setup targets")]
    Setup(#[source] AggregateError),

    #[error("invalid network: {0}")]
    InvalidNetwork(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProvisionError {
    /// The phase-level aggregate, if this is a phase failure
    pub fn aggregate(&self) -> Option<&AggregateError> {
        match self {
            ProvisionError::Artifacts(agg) | ProvisionError::Setup(agg) => Some(agg),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
