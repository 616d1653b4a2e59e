//! Connection provisioning for the two connection strategies.
//!
//! `named_resource` resolves a pool from the [`ResourceRegistry`], the naming
//! service populated at startup. `direct` validates the configured driver and
//! opens a fresh, non-pooled connection for each decision.

use async_trait::async_trait;
use credgate_core::{ConnectionConfig, ConnectionStrategy, NamedResourceConfig};
use secrecy::ExposeSecret;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{AnyConnection, AnyPool, Connection};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use url::Url;

use crate::connection::{ConnectionProvider, CredentialConnection, ScopedConnection};
use crate::error::ConnectionError;

/// Database drivers compiled into the Any driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDriver {
    Postgres,
    MySql,
    Sqlite,
}

impl SqlDriver {
    /// Resolve a configured driver identifier. Matching ignores case.
    pub fn from_identifier(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(SqlDriver::Postgres),
            "mysql" | "mariadb" => Some(SqlDriver::MySql),
            "sqlite" | "sqlite3" => Some(SqlDriver::Sqlite),
            _ => None,
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            SqlDriver::Postgres => "postgres",
            SqlDriver::MySql => "mysql",
            SqlDriver::Sqlite => "sqlite",
        }
    }

    fn schemes(self) -> &'static [&'static str] {
        match self {
            SqlDriver::Postgres => &["postgres", "postgresql"],
            SqlDriver::MySql => &["mysql", "mariadb"],
            SqlDriver::Sqlite => &["sqlite"],
        }
    }

    /// Whether this driver accepts URLs with the given scheme.
    pub fn serves(self, url: &Url) -> bool {
        self.schemes().contains(&url.scheme())
    }

    /// File-based drivers take no principal or secret.
    fn authenticates(self) -> bool {
        !matches!(self, SqlDriver::Sqlite)
    }
}

/// Build the URL for a direct connection, carrying the configured principal
/// and secret.
pub fn direct_url(driver: SqlDriver, config: &ConnectionConfig) -> Result<Url, ConnectionError> {
    let mut url = Url::parse(config.url.trim())
        .map_err(|e| ConnectionError::InvalidUrl(format!("{}: {}", redacted(&config.url), e)))?;

    if !driver.serves(&url) {
        return Err(ConnectionError::DriverUnavailable {
            driver: config.driver.clone(),
            reason: format!("cannot serve '{}' URLs", url.scheme()),
        });
    }

    if driver.authenticates() && !config.principal.is_empty() {
        url.set_username(&config.principal).map_err(|_| {
            ConnectionError::InvalidUrl(format!(
                "{} cannot carry credentials",
                redacted(&config.url)
            ))
        })?;
        let secret = config.resolve_secret();
        url.set_password(secret.as_ref().map(|s| s.expose_secret()))
            .map_err(|_| {
                ConnectionError::InvalidUrl(format!(
                    "{} cannot carry credentials",
                    redacted(&config.url)
                ))
            })?;
    }

    Ok(url)
}

/// Strip any password from a URL before it is logged or reported.
pub fn redacted(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Naming service mapping resource names to pre-pooled data sources.
///
/// Populated once at startup; lookups never create pools.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    pools: HashMap<String, AnyPool>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build lazily-connecting pools for every configured resource.
    pub fn from_config(
        resources: &BTreeMap<String, NamedResourceConfig>,
    ) -> Result<Self, ConnectionError> {
        install_default_drivers();

        let mut registry = Self::new();
        for (name, resource) in resources {
            let url = resource.connection_string().ok_or_else(|| {
                ConnectionError::InvalidUrl(format!("resource '{}' has no url", name))
            })?;
            let pool = AnyPoolOptions::new()
                .min_connections(resource.pool.min_connections)
                .max_connections(resource.pool.max_connections)
                .acquire_timeout(Duration::from_secs(u64::from(
                    resource.pool.acquire_timeout_seconds,
                )))
                .idle_timeout(Duration::from_secs(u64::from(
                    resource.pool.idle_timeout_seconds,
                )))
                .connect_lazy(&url)
                .map_err(ConnectionError::AcquireFailed)?;

            tracing::debug!(resource = %name, url = %redacted(&url), "registered named resource");
            registry.register(name.clone(), pool);
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, pool: AnyPool) {
        self.pools.insert(name.into(), pool);
    }

    pub fn lookup(&self, name: &str) -> Option<&AnyPool> {
        self.pools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pools.keys().map(String::as_str)
    }
}

/// [`ConnectionProvider`] backed by sqlx.
pub struct SqlConnectionProvider {
    resources: ResourceRegistry,
}

impl SqlConnectionProvider {
    pub fn new(resources: ResourceRegistry) -> Self {
        install_default_drivers();
        Self { resources }
    }

    async fn acquire_named(&self, name: &str) -> Result<ScopedConnection, ConnectionError> {
        tracing::trace!(resource = %name, "using named resource connection pool");
        let pool = self
            .resources
            .lookup(name)
            .ok_or_else(|| ConnectionError::ResourceNotFound(name.to_string()))?;

        let connection = pool.acquire().await.map_err(ConnectionError::AcquireFailed)?;
        Ok(ScopedConnection::Pooled(connection))
    }

    async fn acquire_direct(
        &self,
        config: &ConnectionConfig,
    ) -> Result<ScopedConnection, ConnectionError> {
        tracing::trace!(driver = %config.driver, "using non-pooled direct connection");
        let driver = SqlDriver::from_identifier(&config.driver).ok_or_else(|| {
            ConnectionError::DriverUnavailable {
                driver: config.driver.clone(),
                reason: "unknown driver".to_string(),
            }
        })?;

        let url = direct_url(driver, config)?;
        let connection = AnyConnection::connect(url.as_str())
            .await
            .map_err(ConnectionError::AcquireFailed)?;
        Ok(ScopedConnection::Direct(connection))
    }
}

#[async_trait]
impl ConnectionProvider for SqlConnectionProvider {
    async fn acquire(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn CredentialConnection>, ConnectionError> {
        let connection = match config.strategy {
            ConnectionStrategy::NamedResource => {
                self.acquire_named(config.named_resource.trim()).await?
            }
            ConnectionStrategy::Direct => self.acquire_direct(config).await?,
        };
        tracing::trace!(strategy = ?config.strategy, "connection acquired");
        Ok(Box::new(connection))
    }
}
