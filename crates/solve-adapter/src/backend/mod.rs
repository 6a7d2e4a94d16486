//! Backend Adapters - Connection handles and their registry

pub mod registry;
pub mod simulated;

pub use registry::{simulated_registry, InMemoryBackendRegistry};
pub use simulated::SimulatedChain;
