//! Core traits and types for pact publishing
//!
//! This module defines the transport seam to the broker and the value types
//! that flow between the inspector, the publisher and the batch orchestrator.

use crate::core::error::PublishError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use url::Url;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of publishing one pact file
///
/// One outcome is produced per processed file. Failures carry enough detail
/// (status, reason, body) to diagnose the problem without re-running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub success: bool,
    pub message: String,
}

impl PublishOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "OK" } else { "FAIL" };
        write!(f, "[{}] {}", status, self.message)
    }
}

// ============================================================================
// Participants
// ============================================================================

/// Consumer and provider named by a pact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantPair {
    pub consumer: String,
    pub provider: String,
}

/// Outcome of looking up the participants of a pact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantLookup {
    Found(ParticipantPair),
    /// Unreadable file, invalid JSON, or a missing/blank name
    NotFound { reason: String },
}

impl ParticipantLookup {
    pub fn found(&self) -> Option<&ParticipantPair> {
        match self {
            Self::Found(pair) => Some(pair),
            Self::NotFound { .. } => None,
        }
    }
}

// ============================================================================
// Broker transport
// ============================================================================

/// Raw response from the broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl BrokerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used to talk to the broker
///
/// Implementations apply authentication themselves; callers only supply the
/// target URL and the JSON body, which is sent byte for byte.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// `PUT` a JSON body to `url`
    ///
    /// Any HTTP status is a successful call; only transport failures are
    /// errors.
    async fn put_json(&self, url: &Url, body: Vec<u8>) -> Result<BrokerResponse, PublishError>;
}
