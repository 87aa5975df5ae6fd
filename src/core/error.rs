//! Error handling for pact publishing
//!
//! Errors here only cover what can go wrong before a batch starts
//! (configuration, client construction) and inside the transport. Everything
//! that happens while publishing a batch is turned into a
//! [`PublishOutcome`](crate::core::PublishOutcome) instead.

use thiserror::Error;

/// Main error type for pact publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Configuration errors
    #[error("Invalid broker URL '{url}': {reason}")]
    InvalidBrokerUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Client construction errors
    #[error("Invalid {header} header value")]
    InvalidHeader { header: &'static str },

    #[error("Failed to build HTTP client: {message}")]
    HttpClient { message: String },

    // Network errors
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    // Filesystem errors
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Check if this error is caused by configuration the user can fix
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBrokerUrl { .. } | Self::ConfigError(_) | Self::InvalidHeader { .. }
        )
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidBrokerUrl { .. } => vec![
                "Set PACT_BROKER_BASE_URL to an absolute http(s) URL",
                "Example: https://your-broker.pactflow.io",
            ],
            Self::ConfigError(_) => vec![
                "Check the YAML syntax of the config file",
                "Check that the config file is readable",
            ],
            Self::InvalidHeader { .. } => vec![
                "Check PACT_BROKER_TOKEN / PACT_BROKER_USERNAME for control characters",
            ],
            Self::HttpClient { .. } => vec!["Check the TLS configuration of this machine"],
            Self::Transport { .. } => vec![
                "Check network connectivity to the broker",
                "Check that the broker base URL is correct",
            ],
            Self::Io { .. } => vec!["Check that the path exists and is readable"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBrokerUrl { .. } => "INVALID_BROKER_URL",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidHeader { .. } => "INVALID_HEADER",
            Self::HttpClient { .. } => "HTTP_CLIENT",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}
