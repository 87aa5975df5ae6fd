pub mod credentials;

pub use credentials::{BrokerAuth, mask_token};
