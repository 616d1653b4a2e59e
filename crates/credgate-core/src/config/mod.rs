//! Configuration types for the credgate decision node.
//!
//! A node is configured from a single YAML file combining the connection
//! strategy, the credential lookup, the password transform, call timeouts,
//! the named resources available to the `named_resource` strategy and, for
//! standalone use, a minimal identity directory.

pub mod connection;
pub mod directory;
pub mod query;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub use connection::{
    ConnectionConfig, ConnectionPoolConfig, ConnectionStrategy, NamedResourceConfig,
};
pub use directory::{DirectoryConfig, DirectoryMode, DirectoryUser};
pub use query::{CLEAR_TEXT_TRANSFORM, QueryConfig, TransformConfig};

/// Complete node configuration. Fixed once the engine is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    /// How the credential store is reached.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Credential lookup.
    #[serde(default)]
    pub query: QueryConfig,

    /// Password transform selection.
    #[serde(default)]
    pub transform: TransformConfig,

    /// Bounds on blocking calls.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Pooled data sources addressable by the `named_resource` strategy.
    #[serde(default)]
    pub resources: BTreeMap<String, NamedResourceConfig>,

    /// Identity directory used when no host directory is supplied.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Timeouts applied to each blocking call of a decision.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Upper bound for identity lookup, connection acquisition, query
    /// execution and connection release, in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

fn default_call_timeout_ms() -> u64 {
    5000
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NodeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Check the configuration before any decision is made.
    ///
    /// `is_known_transform` tells whether a transform identifier resolves in
    /// the registry the engine will use. Only the active connection strategy
    /// is checked.
    pub fn validate(&self, is_known_transform: impl Fn(&str) -> bool) -> Result<(), ConfigError> {
        match self.connection.strategy {
            ConnectionStrategy::NamedResource => {
                let name = self.connection.named_resource.trim();
                if name.is_empty() {
                    return Err(ConfigError::Config(
                        "connection.named_resource is required for the named_resource strategy"
                            .to_string(),
                    ));
                }
                if !self.resources.is_empty() && !self.resources.contains_key(name) {
                    return Err(ConfigError::Config(format!(
                        "connection.named_resource '{}' is not declared under resources",
                        name
                    )));
                }
            }
            ConnectionStrategy::Direct => {
                for (field, value) in [
                    ("connection.driver", &self.connection.driver),
                    ("connection.url", &self.connection.url),
                ] {
                    if value.trim().is_empty() {
                        return Err(ConfigError::Config(format!(
                            "{} is required for the direct strategy",
                            field
                        )));
                    }
                }
            }
        }

        for (name, resource) in &self.resources {
            if resource.url.is_none() && resource.url_env.is_none() {
                return Err(ConfigError::Config(format!(
                    "resource '{}' needs either url or url_env",
                    name
                )));
            }
        }

        if self.query.statement.trim().is_empty() {
            return Err(ConfigError::Config("query.statement is required".to_string()));
        }
        if !self.query.has_placeholder() {
            return Err(ConfigError::Config(
                "query.statement must bind the username through a positional parameter"
                    .to_string(),
            ));
        }
        if self.query.result_column.trim().is_empty() {
            return Err(ConfigError::Config(
                "query.result_column is required".to_string(),
            ));
        }

        let transform = self.transform.effective_identifier();
        if transform.is_empty() {
            return Err(ConfigError::Config(
                "transform.transform is blank and defaults_to_identity is disabled".to_string(),
            ));
        }
        if !is_known_transform(transform) {
            return Err(ConfigError::Config(format!(
                "unknown password transform '{}'",
                transform
            )));
        }

        if self.timeouts.call_timeout_ms == 0 {
            return Err(ConfigError::Config(
                "timeouts.call_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
