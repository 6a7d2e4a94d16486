//! # Solve Shared
//!
//! Error taxonomy and configuration shared by every provisioning crate.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;
