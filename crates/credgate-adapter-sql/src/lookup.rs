//! Credential lookup.
//!
//! Executes the configured statement for one username and enforces that at
//! most one row matches. The scan stops as soon as a second row shows up, so no
//! more than two rows are ever pulled from the cursor, and only the first one
//! is decoded.

use credgate_core::{QueryConfig, StoredCredential};
use futures::TryStreamExt;

use crate::connection::CredentialConnection;
use crate::error::LookupError;

/// Fetch the stored credential for `username`.
///
/// A NULL column value is returned as [`StoredCredential::absent`], not as an
/// error. The row stream is dropped before this function returns.
pub async fn fetch(
    connection: &mut dyn CredentialConnection,
    query: &QueryConfig,
    username: &str,
) -> Result<StoredCredential, LookupError> {
    tracing::trace!(statement = %query.statement, "executing credential lookup");

    let Some(mut rows) = connection.query(&query.statement, username) else {
        tracing::error!(username, "credential statement produced no cursor");
        return Err(LookupError::UserNotFound(username.to_string()));
    };

    let Some(first) = rows.try_next().await? else {
        tracing::error!(username, "no results from credential query");
        return Err(LookupError::UserNotFound(username.to_string()));
    };

    // The second row is never decoded.
    if rows.try_next().await?.is_some() {
        tracing::error!(
            username,
            "too many results from credential query, username should be a primary key"
        );
        return Err(LookupError::AmbiguousUser(username.to_string()));
    }

    let value = first.credential(&query.result_column)?;
    if value.is_none() {
        tracing::warn!(column = %query.result_column, "null value received for password column");
    }
    Ok(StoredCredential::from(value))
}
