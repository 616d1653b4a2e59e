//! Error types for connection provisioning and credential lookup.

use thiserror::Error;

/// Errors raised while obtaining a connection to the credential store.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The named resource is not registered.
    #[error("named resource '{0}' not found")]
    ResourceNotFound(String),

    /// The configured driver is unknown or cannot serve the URL.
    #[error("driver '{driver}' is not available: {reason}")]
    DriverUnavailable { driver: String, reason: String },

    /// The connection URL could not be used.
    #[error("invalid connection URL: {0}")]
    InvalidUrl(String),

    /// The driver or pool failed to hand out a connection.
    #[error("failed to acquire connection: {0}")]
    AcquireFailed(#[source] sqlx::Error),
}

/// Errors raised by the credential lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No row matched the username.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// More than one row matched the username.
    #[error("user not unique: {0}")]
    AmbiguousUser(String),

    /// Executing the statement or decoding the column failed.
    #[error("credential query failed: {0}")]
    Query(#[from] sqlx::Error),
}
