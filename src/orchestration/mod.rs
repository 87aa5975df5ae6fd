//! Orchestration layer for pact publishing
//!
//! Inspector, single-file publisher and the batch orchestrator that drives
//! both over a directory of pact files.

pub mod artifact_inspector;
pub mod batch_publisher;
pub mod contract_publisher;

#[cfg(test)]
pub(crate) mod test_support;

pub use artifact_inspector::ArtifactInspector;
pub use batch_publisher::{BatchPublisher, find_pact_files};
pub use contract_publisher::ContractPublisher;
