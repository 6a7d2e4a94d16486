//! Domain Models
//!
//! Every name here should match how we talk about provisioning:
//! a network has chains, and each chain receives artifacts.

pub mod address;
pub mod artifact;
pub mod chain;
pub mod network;
