pub mod broker;
pub mod core;
pub mod orchestration;
pub mod security;

pub use broker::HttpBrokerClient;
pub use crate::core::*;
pub use orchestration::{ArtifactInspector, BatchPublisher, ContractPublisher, find_pact_files};
pub use security::{BrokerAuth, mask_token};
