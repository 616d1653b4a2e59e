//! Identity directory consulted before the credential store.

use async_trait::async_trait;
use credgate_core::{DirectoryConfig, DirectoryMode};
use std::collections::HashMap;
use std::sync::Arc;

/// What the identity directory knows about a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub username: String,
    pub active: bool,
}

/// External identity directory consulted before the credential store.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// `Ok(None)` when the identity does not exist. `Err` only when the
    /// directory itself failed.
    async fn find(&self, username: &str) -> anyhow::Result<Option<IdentityRecord>>;
}

/// Treats every username as an existing, active identity.
///
/// Used when the credential store is the only source of truth.
pub struct OpenDirectory;

#[async_trait]
impl IdentityDirectory for OpenDirectory {
    async fn find(&self, username: &str) -> anyhow::Result<Option<IdentityRecord>> {
        Ok(Some(IdentityRecord {
            username: username.to_string(),
            active: true,
        }))
    }
}

/// Fixed set of identities.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, bool>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, username: impl Into<String>, active: bool) -> Self {
        self.users.insert(username.into(), active);
        self
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        config
            .users
            .iter()
            .fold(Self::new(), |dir, user| dir.with_user(user.username.clone(), user.active))
    }
}

#[async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn find(&self, username: &str) -> anyhow::Result<Option<IdentityRecord>> {
        Ok(self.users.get(username).map(|active| IdentityRecord {
            username: username.to_string(),
            active: *active,
        }))
    }
}

/// Build the directory described by the configuration.
pub fn directory_from_config(config: &DirectoryConfig) -> Arc<dyn IdentityDirectory> {
    match config.mode {
        DirectoryMode::Open => Arc::new(OpenDirectory),
        DirectoryMode::Static => Arc::new(StaticDirectory::from_config(config)),
    }
}
