//! Broker transport
//!
//! The only place that knows about HTTP. Everything above it talks to the
//! broker through the [`BrokerClient`](crate::core::BrokerClient) trait.

pub mod http_client;

pub use http_client::HttpBrokerClient;
