//! SQL credential store adapter.
//!
//! Provides the two connection strategies (named pooled resource and direct
//! driver connection) and the single-row credential lookup, on top of sqlx's
//! Any driver so the backend is chosen by configuration.

pub mod connection;
pub mod error;
pub mod lookup;
pub mod provisioner;

pub use connection::{
    ConnectionProvider, CredentialConnection, CredentialRow, CredentialRows, ScopedConnection,
};
pub use error::{ConnectionError, LookupError};
pub use lookup::fetch;
pub use provisioner::{ResourceRegistry, SqlConnectionProvider, SqlDriver};
