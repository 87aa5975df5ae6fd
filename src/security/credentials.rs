//! Broker credentials with memory-safe handling and masking
//!
//! Secrets are held in `secrecy` wrappers so that neither the bearer token nor
//! the basic-auth password can leak through `Debug` output or log lines.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

/// Authentication applied to every request sent to the broker
///
/// A bearer token always wins over basic auth; basic auth only needs a
/// username, a missing password is encoded as an empty string.
///
/// # Examples
///
/// ```
/// use pact_broker_publisher::security::BrokerAuth;
/// use secrecy::{ExposeSecret, SecretString};
///
/// let token = SecretString::from("abc123".to_string());
/// let auth = BrokerAuth::from_parts(Some(token), Some("ci".to_string()), None);
/// let header = auth.authorization_header().unwrap();
/// assert_eq!(header.expose_secret(), "Bearer abc123");
/// ```
#[derive(Debug, Default)]
pub enum BrokerAuth {
    #[default]
    None,
    Bearer(SecretString),
    Basic {
        username: String,
        password: Option<SecretString>,
    },
}

impl BrokerAuth {
    /// Pick the authentication scheme from the optional credential parts
    ///
    /// Blank values are treated as absent.
    pub fn from_parts(
        token: Option<SecretString>,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Self {
        if let Some(token) = token.filter(|t| !t.expose_secret().trim().is_empty()) {
            return Self::Bearer(token);
        }

        match username.filter(|u| !u.trim().is_empty()) {
            Some(username) => Self::Basic { username, password },
            None => Self::None,
        }
    }

    /// Scheme name as it appears in the `Authorization` header
    pub fn scheme(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Bearer(_) => Some("Bearer"),
            Self::Basic { .. } => Some("Basic"),
        }
    }

    /// Full `Authorization` header value, if any
    pub fn authorization_header(&self) -> Option<SecretString> {
        match self {
            Self::None => None,
            Self::Bearer(token) => Some(SecretString::from(format!(
                "Bearer {}",
                token.expose_secret()
            ))),
            Self::Basic { username, password } => {
                let password = password.as_ref().map(|p| p.expose_secret()).unwrap_or("");
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                Some(SecretString::from(format!("Basic {}", encoded)))
            }
        }
    }

    /// Human readable description that is safe to print
    pub fn describe(&self) -> String {
        match self {
            Self::None => "no authentication".to_string(),
            Self::Bearer(token) => format!("bearer token {}", mask_token(token.expose_secret())),
            Self::Basic { username, .. } => format!("basic auth as '{}'", username),
        }
    }
}

/// Masks a token for safe logging
///
/// Shows only the first 3 and last 3 characters for identification purposes.
/// Tokens shorter than 10 characters are fully masked as "****".
///
/// # Examples
///
/// ```
/// use pact_broker_publisher::security::mask_token;
///
/// assert_eq!(mask_token("abcdef123456"), "abc...456");
/// assert_eq!(mask_token("short"), "****");
/// ```
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }

    let prefix: String = chars[..3].iter().collect();
    let suffix: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
