//! Contract Publisher - publishes one pact file to the broker
//!
//! Publishing is a single authenticated `PUT`. When it succeeds the consumer
//! version is tagged with the configured branch and tag; tagging is best
//! effort and never changes the outcome of the publish.

use crate::broker::HttpBrokerClient;
use crate::core::config::BrokerEndpoint;
use crate::core::error::PublishError;
use crate::core::traits::{BrokerClient, BrokerResponse, PublishOutcome};
use std::path::Path;
use tokio::fs;

/// Publishes pact files for one consumer version
pub struct ContractPublisher<C = HttpBrokerClient> {
    endpoint: BrokerEndpoint,
    client: C,
}

impl ContractPublisher<HttpBrokerClient> {
    /// Create a publisher talking HTTP to the configured broker
    pub fn connect(endpoint: BrokerEndpoint) -> Result<Self, PublishError> {
        let client = HttpBrokerClient::new(endpoint.auth())?;
        Ok(Self::with_client(endpoint, client))
    }
}

impl<C: BrokerClient> ContractPublisher<C> {
    pub fn with_client(endpoint: BrokerEndpoint, client: C) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &BrokerEndpoint {
        &self.endpoint
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Publish a single pact file
    ///
    /// The file content is sent as-is. Every failure is reported through the
    /// returned outcome.
    pub async fn publish(&self, consumer: &str, provider: &str, pact_file: &Path) -> PublishOutcome {
        let exists = fs::metadata(pact_file)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !exists {
            return PublishOutcome::failed(format!("Pact file not found: {}", pact_file.display()));
        }

        let content = match fs::read(pact_file).await {
            Ok(content) => content,
            Err(e) => {
                return PublishOutcome::failed(format!(
                    "Failed to read pact file {}: {}",
                    pact_file.display(),
                    e
                ));
            }
        };

        let publish_url = self.endpoint.publish_url(provider, consumer);

        let response = match self.client.put_json(&publish_url, content).await {
            Ok(response) => response,
            Err(PublishError::Transport { message, .. }) => {
                return PublishOutcome::failed(format!(
                    "Failed to publish pact to {}: {}",
                    publish_url, message
                ));
            }
            Err(e) => {
                return PublishOutcome::failed(format!(
                    "Failed to publish pact to {}: {}",
                    publish_url, e
                ));
            }
        };

        if !response.is_success() {
            let status = match response.reason.as_deref() {
                Some(reason) => format!("{} {}", response.status, reason),
                None => response.status.to_string(),
            };
            return PublishOutcome::failed(format!(
                "Failed to publish pact. Status: {}. Body: {}",
                status, response.body
            ));
        }

        if let Some(branch) = self.endpoint.branch() {
            self.tag_best_effort(consumer, branch).await;
        }

        if let Some(tag) = self.endpoint.tag() {
            self.tag_best_effort(consumer, tag).await;
        }

        PublishOutcome::succeeded(format!(
            "Published pact to {} (consumer version: {}, branch: {})",
            publish_url,
            self.endpoint.consumer_version(),
            self.endpoint.branch().unwrap_or("n/a")
        ))
    }

    /// Tag the configured consumer version with `tag`
    ///
    /// Sends `{}` to the tag resource and returns whatever happened. Not
    /// retried. [`publish`](Self::publish) ignores this result apart from
    /// logging it.
    pub async fn tag_version(&self, consumer: &str, tag: &str) -> Result<BrokerResponse, PublishError> {
        let tag_url = self.endpoint.tag_url(consumer, tag);
        self.client.put_json(&tag_url, b"{}".to_vec()).await
    }

    async fn tag_best_effort(&self, consumer: &str, tag: &str) {
        let version = self.endpoint.consumer_version();

        match self.tag_version(consumer, tag).await {
            Ok(response) if response.is_success() => {
                tracing::debug!(consumer, version, tag, "tagged consumer version");
            }
            Ok(response) => {
                tracing::warn!(
                    consumer,
                    version,
                    tag,
                    status = response.status,
                    body = %response.body,
                    "broker rejected tag; publish outcome unaffected"
                );
            }
            Err(e) => {
                tracing::warn!(
                    consumer,
                    version,
                    tag,
                    error = %e,
                    "tag request failed; publish outcome unaffected"
                );
            }
        }
    }
}
