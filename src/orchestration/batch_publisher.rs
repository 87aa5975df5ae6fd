//! Batch Publisher - publishes every pact file in a directory
//!
//! Features:
//! - Strictly sequential publishing, in file name order
//! - No early exit: one outcome per pact file, failures included
//! - Directory problems reported as a single outcome instead of an error

use crate::broker::HttpBrokerClient;
use crate::core::config::BrokerEndpoint;
use crate::core::error::PublishError;
use crate::core::traits::{BrokerClient, ParticipantLookup, PublishOutcome};
use crate::orchestration::artifact_inspector::ArtifactInspector;
use crate::orchestration::contract_publisher::ContractPublisher;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// List the pact files directly inside `pact_dir`
///
/// Non-recursive; files only; `.json` extension compared case-insensitively;
/// sorted by file name.
pub fn find_pact_files(pact_dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut pact_files = Vec::new();

    for entry in WalkDir::new(pact_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| PublishError::Io {
            path: pact_dir.display().to_string(),
            source: e.into(),
        })?;

        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json && path.is_file() {
            pact_files.push(path.to_path_buf());
        }
    }

    Ok(pact_files)
}

/// BatchPublisher - drives inspection and publishing over a directory
pub struct BatchPublisher<C = HttpBrokerClient> {
    publisher: ContractPublisher<C>,
}

impl BatchPublisher<HttpBrokerClient> {
    /// Create a batch publisher talking HTTP to the configured broker
    pub fn connect(endpoint: BrokerEndpoint) -> Result<Self, PublishError> {
        Ok(Self::new(ContractPublisher::connect(endpoint)?))
    }
}

impl<C: BrokerClient> BatchPublisher<C> {
    pub fn new(publisher: ContractPublisher<C>) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &ContractPublisher<C> {
        &self.publisher
    }

    /// Publish all pact files found in `pact_dir`
    ///
    /// Returns one outcome per pact file, in file name order. A missing,
    /// unreadable or empty directory yields exactly one failure outcome.
    pub async fn publish_all(&self, pact_dir: &Path) -> Vec<PublishOutcome> {
        let is_dir = fs::metadata(pact_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return vec![PublishOutcome::failed(format!(
                "Pact directory not found: {}",
                pact_dir.display()
            ))];
        }

        let pact_files = match find_pact_files(pact_dir) {
            Ok(files) => files,
            Err(e) => {
                return vec![PublishOutcome::failed(format!(
                    "Could not read pact directory {}: {}",
                    pact_dir.display(),
                    e
                ))];
            }
        };

        if pact_files.is_empty() {
            return vec![PublishOutcome::failed(format!(
                "No pact JSON files found in: {}",
                pact_dir.display()
            ))];
        }

        tracing::info!(
            count = pact_files.len(),
            dir = %pact_dir.display(),
            "publishing pact files"
        );

        let mut outcomes = Vec::with_capacity(pact_files.len());

        for pact_file in pact_files {
            let outcome = match ArtifactInspector::inspect(&pact_file).await {
                ParticipantLookup::Found(pair) => {
                    self.publisher
                        .publish(&pair.consumer, &pair.provider, &pact_file)
                        .await
                }
                ParticipantLookup::NotFound { reason } => {
                    tracing::debug!(file = %pact_file.display(), %reason, "skipping pact file");
                    PublishOutcome::failed(format!(
                        "Could not extract consumer/provider from: {}",
                        pact_file.display()
                    ))
                }
            };

            tracing::info!(
                file = %pact_file.display(),
                success = outcome.success,
                "pact file processed"
            );
            outcomes.push(outcome);
        }

        outcomes
    }
}
