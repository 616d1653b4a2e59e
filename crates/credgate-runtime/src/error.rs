//! Decision failure taxonomy.
//!
//! Every failure inside a decision is converted into a [`DecisionError`]
//! before it leaves the engine. Driver and query errors only survive as
//! message text.

use credgate_adapter_sql::{ConnectionError, LookupError};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::transform::TransformError;

/// Where the decision state machine stood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStage {
    Start,
    IdentityChecked,
    Connected,
    LookedUp,
    Transformed,
    Compared,
}

impl fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "START"),
            Self::IdentityChecked => write!(f, "IDENTITY_CHECKED"),
            Self::Connected => write!(f, "CONNECTED"),
            Self::LookedUp => write!(f, "LOOKED_UP"),
            Self::Transformed => write!(f, "TRANSFORMED"),
            Self::Compared => write!(f, "COMPARED"),
        }
    }
}

/// Categories of decision failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionErrorKind {
    /// Identity missing or inactive, or no credential row.
    UserNotFound,
    /// More than one credential row for the username.
    AmbiguousUser,
    /// Connection, driver, query or timeout failure.
    BackendError,
    /// The configured transform could not be resolved or failed.
    TransformError,
    /// The identity directory itself failed.
    IdentityServiceError,
}

impl fmt::Display for DecisionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "USER_NOT_FOUND"),
            Self::AmbiguousUser => write!(f, "AMBIGUOUS_USER"),
            Self::BackendError => write!(f, "BACKEND_ERROR"),
            Self::TransformError => write!(f, "TRANSFORM_ERROR"),
            Self::IdentityServiceError => write!(f, "IDENTITY_SERVICE_ERROR"),
        }
    }
}

/// A terminating decision failure. Distinct from a DENY outcome.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct DecisionError {
    /// The kind of failure.
    pub kind: DecisionErrorKind,
    /// State the decision was in when it failed.
    pub stage: DecisionStage,
    /// Human-readable error message.
    pub message: String,
}

impl DecisionError {
    pub fn new(kind: DecisionErrorKind, stage: DecisionStage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
        }
    }

    pub fn user_not_found(stage: DecisionStage, username: &str) -> Self {
        Self::new(
            DecisionErrorKind::UserNotFound,
            stage,
            format!("User not found : {}", username),
        )
    }

    pub fn identity_service(error: anyhow::Error) -> Self {
        Self::new(
            DecisionErrorKind::IdentityServiceError,
            DecisionStage::Start,
            format!("Error locating user: {:#}", error),
        )
    }

    pub fn timed_out(stage: DecisionStage, timeout: Duration) -> Self {
        Self::new(
            DecisionErrorKind::BackendError,
            stage,
            format!("call did not complete within {}ms", timeout.as_millis()),
        )
    }

    pub fn connection(error: ConnectionError) -> Self {
        Self::new(
            DecisionErrorKind::BackendError,
            DecisionStage::IdentityChecked,
            error.to_string(),
        )
    }

    pub fn lookup(error: LookupError) -> Self {
        let kind = match &error {
            LookupError::UserNotFound(_) => DecisionErrorKind::UserNotFound,
            LookupError::AmbiguousUser(_) => DecisionErrorKind::AmbiguousUser,
            LookupError::Query(_) => DecisionErrorKind::BackendError,
        };
        Self::new(kind, DecisionStage::Connected, error.to_string())
    }

    pub fn transform(error: TransformError) -> Self {
        Self::new(
            DecisionErrorKind::TransformError,
            DecisionStage::LookedUp,
            error.to_string(),
        )
    }
}
