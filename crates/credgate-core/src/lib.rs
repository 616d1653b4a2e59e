use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Configuration types shared across all credgate crates
pub mod config;

pub use config::{
    CLEAR_TEXT_TRANSFORM, ConfigError, ConnectionConfig, ConnectionPoolConfig, ConnectionStrategy,
    DirectoryConfig, DirectoryMode, DirectoryUser, NamedResourceConfig, NodeConfig, QueryConfig,
    TimeoutConfig, TransformConfig,
};

/// Shared-state key carrying the claimed username.
pub const USERNAME: &str = "username";

/// Transient-state key carrying the submitted password.
pub const PASSWORD: &str = "password";

/// One (username, password) pair to decide on.
///
/// The password is wrapped in `SecretString` so `Debug` never prints it.
/// `None` means no password was submitted at all, which always denies.
#[derive(Debug)]
pub struct VerificationRequest {
    pub username: String,
    pub password: Option<SecretString>,
}

impl VerificationRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(SecretString::from(password.into())),
        }
    }

    pub fn without_password(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }
}

/// Password value read from the credential store.
///
/// `None` means the column was NULL, which is not the same as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    value: Option<String>,
}

impl StoredCredential {
    pub fn present(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn absent() -> Self {
        Self { value: None }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn into_value(self) -> Option<String> {
        self.value
    }
}

impl From<Option<String>> for StoredCredential {
    fn from(value: Option<String>) -> Self {
        Self { value }
    }
}

/// Terminal result of a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Allow,
    Deny,
}

impl Outcome {
    pub fn is_allow(self) -> bool {
        matches!(self, Outcome::Allow)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Allow => f.write_str("ALLOW"),
            Outcome::Deny => f.write_str("DENY"),
        }
    }
}

/// Per-flow state handed over by the host authentication flow.
///
/// `shared` survives across steps of the flow; `transient` holds values such as
/// the submitted password that must not be persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowState {
    #[serde(default)]
    pub shared: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub transient: HashMap<String, serde_json::Value>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor placing the username in shared state and the
    /// password in transient state.
    pub fn with_credentials(username: &str, password: &str) -> Self {
        let mut state = Self::new();
        state
            .shared
            .insert(USERNAME.to_string(), serde_json::Value::from(username));
        state
            .transient
            .insert(PASSWORD.to_string(), serde_json::Value::from(password));
        state
    }

    pub fn username(&self) -> Option<&str> {
        self.shared.get(USERNAME).and_then(|v| v.as_str())
    }

    pub fn password(&self) -> Option<&str> {
        self.transient.get(PASSWORD).and_then(|v| v.as_str())
    }

    /// Build the request for this flow. Returns `None` when no username is present.
    ///
    /// A missing password is carried as `None`, not as an empty string.
    pub fn to_request(&self) -> Option<VerificationRequest> {
        let username = self.username()?;
        Some(match self.password() {
            Some(password) => VerificationRequest::new(username, password),
            None => VerificationRequest::without_password(username),
        })
    }
}
