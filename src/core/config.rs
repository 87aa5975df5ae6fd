//! Configuration structures and types for pact-broker-publisher
//!
//! [`PublisherSettings`] is the raw, layered input (config file, environment,
//! CLI). [`BrokerEndpoint`] is the validated, immutable configuration a
//! publisher is built from.

use crate::core::error::PublishError;
use crate::security::BrokerAuth;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Everything except RFC 3986 unreserved characters is escaped
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Environment variable names understood by the config loader
pub mod env_vars {
    /// Broker base URL. Publishing is skipped when this is not set.
    pub const BROKER_BASE_URL: &str = "PACT_BROKER_BASE_URL";
    pub const BROKER_TOKEN: &str = "PACT_BROKER_TOKEN";
    pub const BROKER_USERNAME: &str = "PACT_BROKER_USERNAME";
    pub const BROKER_PASSWORD: &str = "PACT_BROKER_PASSWORD";
    pub const CONSUMER_VERSION: &str = "CONSUMER_VERSION";
    /// Commit identifier set by GitHub Actions
    pub const COMMIT_SHA: &str = "GITHUB_SHA";
    /// Branch names, in lookup order
    pub const BRANCH: [&str; 2] = ["GITHUB_REF_NAME", "GIT_BRANCH"];
    pub const TAG: &str = "PACT_TAG";
}

/// Pact directory used when nothing else is configured
pub const DEFAULT_PACT_DIR: &str = "pacts";

/// Layered publisher settings
///
/// Every field is optional; layers are combined with [`PublisherSettings::merge`]
/// and the result is validated by [`BrokerEndpoint::resolve`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSettings {
    /// Broker base URL (e.g. https://your-broker.pactflow.io)
    #[serde(default)]
    pub broker_url: Option<String>,

    /// Explicit consumer version
    #[serde(default)]
    pub consumer_version: Option<String>,

    /// CI commit identifier, used when no explicit version is set
    #[serde(skip)]
    pub commit_sha: Option<String>,

    /// Branch label to tag the consumer version with
    #[serde(default)]
    pub branch: Option<String>,

    /// Extra tag label
    #[serde(default)]
    pub tag: Option<String>,

    /// Bearer token (takes precedence over basic auth)
    #[serde(default)]
    pub token: Option<SecretString>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<SecretString>,

    /// Directory holding the generated pact files
    #[serde(default)]
    pub pact_dir: Option<PathBuf>,
}

impl PublisherSettings {
    /// Merge a higher priority layer on top of this one
    ///
    /// Fields set in `higher` win; unset fields fall back to `self`.
    pub fn merge(self, higher: PublisherSettings) -> PublisherSettings {
        PublisherSettings {
            broker_url: higher.broker_url.or(self.broker_url),
            consumer_version: higher.consumer_version.or(self.consumer_version),
            commit_sha: higher.commit_sha.or(self.commit_sha),
            branch: higher.branch.or(self.branch),
            tag: higher.tag.or(self.tag),
            token: higher.token.or(self.token),
            username: higher.username.or(self.username),
            password: higher.password.or(self.password),
            pact_dir: higher.pact_dir.or(self.pact_dir),
        }
    }

    /// Directory to publish from, falling back to [`DEFAULT_PACT_DIR`]
    pub fn pact_dir(&self) -> PathBuf {
        self.pact_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PACT_DIR))
    }
}

/// Immutable broker configuration owned by a publisher
#[derive(Debug)]
pub struct BrokerEndpoint {
    base_url: Url,
    consumer_version: String,
    branch: Option<String>,
    tag: Option<String>,
    auth: BrokerAuth,
}

impl BrokerEndpoint {
    /// Create an endpoint for `base_url` publishing `consumer_version`
    ///
    /// The base URL must be an absolute http(s) URL; trailing slashes are
    /// removed.
    pub fn new(base_url: &str, consumer_version: impl Into<String>) -> Result<Self, PublishError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            consumer_version: consumer_version.into(),
            branch: None,
            tag: None,
            auth: BrokerAuth::None,
        })
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = non_blank(branch);
        self
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = non_blank(tag);
        self
    }

    pub fn with_auth(mut self, auth: BrokerAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Resolve settings into an endpoint using the current time
    ///
    /// Returns `Ok(None)` when no broker URL is configured: publishing is
    /// skipped, which is not an error.
    pub fn resolve(settings: PublisherSettings) -> Result<Option<Self>, PublishError> {
        Self::resolve_at(settings, Utc::now())
    }

    /// Resolve settings into an endpoint
    ///
    /// Version priority: explicit version, then the CI commit identifier,
    /// then `local-<UTC timestamp>` derived from `now`.
    pub fn resolve_at(
        settings: PublisherSettings,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, PublishError> {
        let Some(broker_url) = non_blank(settings.broker_url) else {
            return Ok(None);
        };

        let consumer_version = non_blank(settings.consumer_version)
            .or_else(|| non_blank(settings.commit_sha))
            .unwrap_or_else(|| local_version(now));

        let auth = BrokerAuth::from_parts(settings.token, settings.username, settings.password);

        let endpoint = Self::new(&broker_url, consumer_version)?
            .with_branch(settings.branch)
            .with_tag(settings.tag)
            .with_auth(auth);

        Ok(Some(endpoint))
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn consumer_version(&self) -> &str {
        &self.consumer_version
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn auth(&self) -> &BrokerAuth {
        &self.auth
    }

    /// `{base}/pacts/provider/{provider}/consumer/{consumer}/version/{version}`
    pub fn publish_url(&self, provider: &str, consumer: &str) -> Url {
        self.url_for(&[
            "pacts",
            "provider",
            provider,
            "consumer",
            consumer,
            "version",
            &self.consumer_version,
        ])
    }

    /// `{base}/pacticipants/{consumer}/versions/{version}/tags/{tag}`
    pub fn tag_url(&self, consumer: &str, tag: &str) -> Url {
        self.url_for(&[
            "pacticipants",
            consumer,
            "versions",
            &self.consumer_version,
            "tags",
            tag,
        ])
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut path = self.base_url.path().trim_end_matches('/').to_string();
        for segment in segments {
            path.push('/');
            path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }

        let mut url = self.base_url.clone();
        url.set_path(&path);
        url
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, PublishError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| PublishError::InvalidBrokerUrl {
        url: trimmed.to_string(),
        reason,
    };

    let mut url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    Ok(url)
}

fn local_version(now: DateTime<Utc>) -> String {
    format!("local-{}", now.format("%Y%m%d%H%M%S"))
}

/// Treat empty and whitespace-only values as unset
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
