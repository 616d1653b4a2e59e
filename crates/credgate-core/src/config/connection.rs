//! Credential store connection configuration.
//!
//! Two strategies are supported:
//! 1. `named_resource` - look up a pre-pooled data source registered under a name
//! 2. `direct` - open a fresh connection with a driver, URL and credentials
//!
//! Only the fields of the active strategy are read; the others are ignored.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// How a connection to the credential store is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// Resolve a pooled data source from the resource registry.
    NamedResource,
    /// Open a non-pooled connection for each decision.
    #[default]
    Direct,
}

/// Configuration for reaching the credential store.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Active strategy.
    #[serde(default)]
    pub strategy: ConnectionStrategy,

    /// Name of the pooled data source (named_resource strategy).
    #[serde(default = "default_named_resource")]
    pub named_resource: String,

    /// Driver identifier, e.g. `postgres`, `mysql`, `sqlite` (direct strategy).
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Connection URL (direct strategy).
    #[serde(default = "default_url")]
    pub url: String,

    /// Database user (direct strategy).
    #[serde(default = "default_principal")]
    pub principal: String,

    /// Database password (direct strategy).
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub secret: Option<SecretString>,

    /// Environment variable containing the database password.
    /// Takes precedence over `secret`.
    #[serde(default)]
    pub secret_env: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            strategy: ConnectionStrategy::default(),
            named_resource: default_named_resource(),
            driver: default_driver(),
            url: default_url(),
            principal: default_principal(),
            secret: None,
            secret_env: None,
        }
    }
}

impl ConnectionConfig {
    /// Get the secret, checking `secret_env` first.
    pub fn resolve_secret(&self) -> Option<SecretString> {
        if let Some(env_var) = &self.secret_env
            && let Ok(secret) = std::env::var(env_var)
        {
            return Some(SecretString::from(secret));
        }
        self.secret.clone()
    }
}

/// A pooled data source registered under a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResourceConfig {
    /// Environment variable containing the connection URL. Highest precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,

    /// Full connection URL, credentials included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Pool sizing and timeouts.
    #[serde(default)]
    pub pool: ConnectionPoolConfig,
}

impl NamedResourceConfig {
    /// Resolve the connection URL: `url_env` first, then `url`.
    pub fn connection_string(&self) -> Option<String> {
        if let Some(env_var) = &self.url_env
            && let Ok(url) = std::env::var(env_var)
        {
            return Some(url);
        }
        self.url.clone()
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolConfig {
    /// Minimum number of connections to maintain.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout in seconds when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u32,

    /// How long a connection can remain idle before being closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(SecretString::from))
}

// Default value functions
fn default_named_resource() -> String {
    "samplePool".to_string()
}

fn default_driver() -> String {
    "mysql".to_string()
}

fn default_url() -> String {
    "mysql://127.0.0.1:3306/test".to_string()
}

fn default_principal() -> String {
    "root".to_string()
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u32 {
    30
}

fn default_idle_timeout() -> u32 {
    600
}
