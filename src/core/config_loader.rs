//! Configuration loader for pact-broker-publisher
//!
//! Layers, from low to high priority:
//! 1. Defaults
//! 2. Config file (`./.pact-publish.yaml` or an explicit path)
//! 3. Environment variables
//! 4. CLI arguments
//!
//! The environment is passed in as a snapshot; nothing in here reads the
//! process environment directly.

use super::config::{PublisherSettings, env_vars, non_blank};
use crate::core::error::PublishError;
use regex::{Captures, Regex};
use secrecy::SecretString;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name looked up in the project directory
pub const CONFIG_FILENAME: &str = ".pact-publish.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Configuration load options
#[derive(Debug, Default)]
pub struct ConfigLoadOptions {
    /// Directory searched for [`CONFIG_FILENAME`]
    pub project_path: PathBuf,

    /// Explicit config file; unlike the default file it must exist
    pub config_path: Option<PathBuf>,

    /// Environment snapshot
    pub env: HashMap<String, String>,

    /// CLI arguments (highest priority)
    pub cli_args: PublisherSettings,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from all layers
    pub async fn load(options: ConfigLoadOptions) -> Result<PublisherSettings, PublishError> {
        let file_config = match &options.config_path {
            Some(path) => Some(
                Self::load_config_file(path, &options.env)
                    .await?
                    .ok_or_else(|| {
                        PublishError::ConfigError(format!(
                            "Config file not found: {}",
                            path.display()
                        ))
                    })?,
            ),
            None => {
                let default_path = options.project_path.join(CONFIG_FILENAME);
                Self::load_config_file(&default_path, &options.env).await?
            }
        };

        let settings = PublisherSettings::default()
            .merge(file_config.unwrap_or_default())
            .merge(Self::load_env_config(&options.env))
            .merge(options.cli_args);

        Ok(settings)
    }

    /// Load settings from a YAML file, expanding `${VAR}` placeholders
    ///
    /// Returns `Ok(None)` when the file does not exist.
    async fn load_config_file(
        file_path: &Path,
        env: &HashMap<String, String>,
    ) -> Result<Option<PublisherSettings>, PublishError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            PublishError::ConfigError(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Some(PublisherSettings::default()));
        }

        let raw: Value = serde_yaml::from_str(&content).map_err(|e| {
            PublishError::ConfigError(format!("Failed to parse YAML config: {}", e))
        })?;

        let env_var_regex = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| PublishError::ConfigError(format!("Invalid pattern: {}", e)))?;
        let expanded = Self::expand_env_vars(raw, env, &env_var_regex);

        let settings = serde_yaml::from_value(expanded).map_err(|e| {
            PublishError::ConfigError(format!(
                "Invalid config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        Ok(Some(settings))
    }

    /// Map the known environment variables onto settings
    ///
    /// Blank values are ignored so that an exported-but-empty variable does
    /// not shadow a lower layer.
    pub fn load_env_config(env: &HashMap<String, String>) -> PublisherSettings {
        let get = |name: &str| non_blank(env.get(name).cloned());

        PublisherSettings {
            broker_url: get(env_vars::BROKER_BASE_URL),
            consumer_version: get(env_vars::CONSUMER_VERSION),
            commit_sha: get(env_vars::COMMIT_SHA),
            branch: env_vars::BRANCH.iter().find_map(|&name| get(name)),
            tag: get(env_vars::TAG),
            token: get(env_vars::BROKER_TOKEN).map(SecretString::from),
            username: get(env_vars::BROKER_USERNAME),
            password: get(env_vars::BROKER_PASSWORD).map(SecretString::from),
            pact_dir: None,
        }
    }

    /// Expand `${VAR}` placeholders in every string of a YAML document
    fn expand_env_vars(value: Value, env: &HashMap<String, String>, pattern: &Regex) -> Value {
        match value {
            Value::String(s) => Value::String(Self::expand_string(&s, env, pattern)),
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| Self::expand_env_vars(item, env, pattern))
                    .collect(),
            ),
            Value::Mapping(mapping) => Value::Mapping(
                mapping
                    .into_iter()
                    .map(|(k, v)| (k, Self::expand_env_vars(v, env, pattern)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Expand environment variables in a single string
    ///
    /// Unknown variables are left in place.
    fn expand_string(input: &str, env: &HashMap<String, String>, pattern: &Regex) -> String {
        pattern
            .replace_all(input, |cap: &Captures| {
                let var_name = &cap[1];
                match env.get(var_name) {
                    Some(value) => value.clone(),
                    None => {
                        tracing::warn!(variable = var_name, "environment variable not found");
                        cap[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}
