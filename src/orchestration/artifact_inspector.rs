//! Artifact Inspector - reads the participants out of a pact file
//!
//! Only `consumer.name` and `provider.name` are looked at; the rest of the
//! document is not validated. A leading UTF-8 byte-order mark is ignored.

use crate::core::traits::{ParticipantLookup, ParticipantPair};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Deserialize)]
struct PactDocument {
    #[serde(default)]
    consumer: Option<PactParticipant>,
    #[serde(default)]
    provider: Option<PactParticipant>,
}

#[derive(Debug, Deserialize)]
struct PactParticipant {
    #[serde(default)]
    name: Option<String>,
}

/// Extracts the consumer/provider pair from pact files
pub struct ArtifactInspector;

impl ArtifactInspector {
    /// Inspect the pact file at `path`
    ///
    /// Never fails: unreadable files, invalid JSON and missing names all
    /// produce [`ParticipantLookup::NotFound`].
    pub async fn inspect(path: &Path) -> ParticipantLookup {
        match fs::read(path).await {
            Ok(content) => Self::inspect_bytes(&content),
            Err(e) => ParticipantLookup::NotFound {
                reason: format!("failed to read file: {}", e),
            },
        }
    }

    /// Inspect pact JSON already held in memory
    pub fn inspect_str(content: &str) -> ParticipantLookup {
        Self::inspect_bytes(content.as_bytes())
    }

    /// Inspect raw pact file content
    pub fn inspect_bytes(content: &[u8]) -> ParticipantLookup {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

        let document: PactDocument = match serde_json::from_slice(content) {
            Ok(document) => document,
            Err(e) => {
                return ParticipantLookup::NotFound {
                    reason: format!("invalid pact JSON: {}", e),
                };
            }
        };

        let consumer = participant_name(document.consumer);
        let provider = participant_name(document.provider);

        match (consumer, provider) {
            (Some(consumer), Some(provider)) => {
                ParticipantLookup::Found(ParticipantPair { consumer, provider })
            }
            (None, _) => ParticipantLookup::NotFound {
                reason: "missing consumer.name".to_string(),
            },
            (_, None) => ParticipantLookup::NotFound {
                reason: "missing provider.name".to_string(),
            },
        }
    }
}

fn participant_name(participant: Option<PactParticipant>) -> Option<String> {
    participant
        .and_then(|p| p.name)
        .filter(|name| !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_PACT: &str = r#"{
        "consumer": { "name": "PCAW-Consumer" },
        "provider": { "name": "NIOP-Beat-Inventory-Api" },
        "interactions": [],
        "metadata": { "pactSpecification": { "version": "3.0.0" } }
    }"#;

    #[test]
    fn test_extracts_both_participants() {
        let lookup = ArtifactInspector::inspect_str(VALID_PACT);
        assert_eq!(
            lookup,
            ParticipantLookup::Found(ParticipantPair {
                consumer: "PCAW-Consumer".to_string(),
                provider: "NIOP-Beat-Inventory-Api".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_provider_name() {
        let lookup = ArtifactInspector::inspect_str(r#"{"consumer":{"name":"web"},"provider":{}}"#);
        assert_eq!(
            lookup,
            ParticipantLookup::NotFound {
                reason: "missing provider.name".to_string()
            }
        );
    }

    #[test]
    fn test_missing_consumer_object() {
        let lookup = ArtifactInspector::inspect_str(r#"{"provider":{"name":"api"}}"#);
        assert!(lookup.found().is_none());
    }

    #[test]
    fn test_blank_name_counts_as_missing() {
        let lookup =
            ArtifactInspector::inspect_str(r#"{"consumer":{"name":"  "},"provider":{"name":"api"}}"#);
        assert!(lookup.found().is_none());
    }

    #[test]
    fn test_wrong_types_are_not_found() {
        assert!(ArtifactInspector::inspect_str(r#"{"consumer":"web","provider":{"name":"api"}}"#)
            .found()
            .is_none());
        assert!(ArtifactInspector::inspect_str(r#"{"consumer":{"name":1},"provider":{"name":"api"}}"#)
            .found()
            .is_none());
        assert!(ArtifactInspector::inspect_str("[]").found().is_none());
    }

    #[test]
    fn test_invalid_json() {
        match ArtifactInspector::inspect_str("{ not json") {
            ParticipantLookup::NotFound { reason } => assert!(reason.starts_with("invalid pact JSON")),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inspect_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pcaw-niop.json");
        std::fs::write(&path, VALID_PACT).unwrap();

        let lookup = ArtifactInspector::inspect(&path).await;
        assert_eq!(lookup.found().unwrap().consumer, "PCAW-Consumer");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let lookup = ArtifactInspector::inspect_str(&format!("\u{feff}{}", VALID_PACT));
        assert_eq!(lookup.found().unwrap().provider, "NIOP-Beat-Inventory-Api");
    }

    #[test]
    fn test_non_utf8_name_is_not_found() {
        let mut content = br#"{"consumer":{"name":"caf"#.to_vec();
        content.push(0xE9);
        content.extend_from_slice(br#""},"provider":{"name":"api"}}"#);

        match ArtifactInspector::inspect_bytes(&content) {
            ParticipantLookup::NotFound { reason } => assert!(reason.starts_with("invalid pact JSON")),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inspect_file_with_byte_order_mark() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.json");
        let mut content = UTF8_BOM.to_vec();
        content.extend_from_slice(br#"{"consumer":{"name":"web"},"provider":{"name":"api"}}"#);
        std::fs::write(&path, content).unwrap();

        let lookup = ArtifactInspector::inspect(&path).await;
        assert_eq!(lookup.found().unwrap().consumer, "web");
    }

    #[tokio::test]
    async fn test_inspect_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let lookup = ArtifactInspector::inspect(&temp_dir.path().join("absent.json")).await;

        match lookup {
            ParticipantLookup::NotFound { reason } => assert!(reason.starts_with("failed to read file")),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }
}
