//! drctl - DR operator test-environment tooling
//!
//! Deploys the operator image to the hub and managed clusters of a test
//! environment concurrently, and keeps a staleness-bounded local cache of
//! rendered kustomization bundles.

pub mod cache;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod orchestration;
pub mod process;

pub use error::{DrctlError, DrctlResult};
