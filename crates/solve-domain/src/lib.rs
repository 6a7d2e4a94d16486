//! # Solve Domain
//!
//! The vocabulary of solve provisioning, free of any I/O.
//!
//! ```text
//! Network ──┬── Chain (id, name)
//!           ├── Chain
//!           └── Chain ──► ArtifactRef (kind, address, status)
//! ```
//!
//! Everything here is a plain value: cheap to clone and safe to move into
//! concurrently running tasks.

pub mod model;

pub use model::{
    address::Address,
    artifact::{ArtifactKind, ArtifactRef, DeployStatus},
    chain::{Chain, ChainId},
    network::{Network, NetworkError, NetworkId},
};
