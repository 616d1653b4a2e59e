//! Scoped connections to the credential store.
//!
//! A [`CredentialConnection`] yields the undecoded rows of the credential
//! statement as a stream that borrows the connection. The stream owns the
//! bound statement and its cursor, so dropping it releases both, and the
//! borrow guarantees that it is dropped before the connection itself can be
//! released.

use async_trait::async_trait;
use credgate_core::ConnectionConfig;
use futures::stream::{BoxStream, StreamExt};
use sqlx::any::AnyRow;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, Connection, Row};

use crate::error::ConnectionError;

/// One row returned by the credential statement. Nothing is decoded until
/// [`CredentialRow::credential`] is called.
pub trait CredentialRow: Send {
    /// Decode `column` as a nullable string.
    fn credential(&self, column: &str) -> Result<Option<String>, sqlx::Error>;
}

impl CredentialRow for AnyRow {
    fn credential(&self, column: &str) -> Result<Option<String>, sqlx::Error> {
        self.try_get::<Option<String>, _>(column)
    }
}

/// Rows returned by the credential statement.
pub type CredentialRows<'c> = BoxStream<'c, Result<Box<dyn CredentialRow>, sqlx::Error>>;

/// Resolves a connection for one decision.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Box<dyn CredentialConnection>, ConnectionError>;
}

/// A connection that must be released exactly once by its holder.
#[async_trait]
pub trait CredentialConnection: Send {
    /// Runs `statement` with `username` bound as its only parameter and streams
    /// the resulting rows. `None` means no cursor was produced.
    fn query<'c>(
        &'c mut self,
        statement: &'c str,
        username: &'c str,
    ) -> Option<CredentialRows<'c>>;

    /// Give the connection back: pooled connections return to their pool,
    /// direct connections are closed.
    async fn release(self: Box<Self>) -> Result<(), sqlx::Error>;
}

/// Connection obtained through one of the two strategies.
pub enum ScopedConnection {
    Pooled(PoolConnection<Any>),
    Direct(AnyConnection),
}

#[async_trait]
impl CredentialConnection for ScopedConnection {
    fn query<'c>(
        &'c mut self,
        statement: &'c str,
        username: &'c str,
    ) -> Option<CredentialRows<'c>> {
        let connection: &'c mut AnyConnection = match self {
            ScopedConnection::Pooled(pooled) => &mut **pooled,
            ScopedConnection::Direct(direct) => direct,
        };

        let rows = sqlx::query(statement)
            .bind(username)
            .fetch(connection)
            .map(|row| row.map(|row| Box::new(row) as Box<dyn CredentialRow>))
            .boxed();

        Some(rows)
    }

    async fn release(self: Box<Self>) -> Result<(), sqlx::Error> {
        match *self {
            ScopedConnection::Pooled(pooled) => {
                drop(pooled);
                Ok(())
            }
            ScopedConnection::Direct(direct) => direct.close().await,
        }
    }
}
