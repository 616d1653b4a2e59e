use credgate_adapter_sql::{ConnectionProvider, CredentialConnection, fetch};
use credgate_core::{ConfigError, NodeConfig, Outcome, StoredCredential, VerificationRequest};
use secrecy::ExposeSecret;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::Instrument;
use uuid::Uuid;

use crate::audit::{AuditSink, DecisionEvent};
use crate::error::{DecisionError, DecisionStage};
use crate::identity::IdentityDirectory;
use crate::transform::TransformRegistry;

/// Decides whether a submitted password matches the stored credential.
///
/// The engine holds only immutable configuration and shared collaborators,
/// so one instance can serve any number of concurrent decisions.
pub struct DecisionEngine<P: ConnectionProvider, S: AuditSink> {
    config: NodeConfig,
    directory: Arc<dyn IdentityDirectory>,
    provider: P,
    transforms: TransformRegistry,
    audit: S,
    call_timeout: Duration,
}

impl<P: ConnectionProvider, S: AuditSink> DecisionEngine<P, S> {
    /// Build an engine after validating `config` against the registered transforms.
    pub fn new(
        config: NodeConfig,
        directory: Arc<dyn IdentityDirectory>,
        provider: P,
        transforms: TransformRegistry,
        audit: S,
    ) -> Result<Self, ConfigError> {
        config.validate(|id| transforms.contains(id))?;
        let call_timeout = config.timeouts.call_timeout();
        Ok(Self {
            config,
            directory,
            provider,
            transforms,
            audit,
            call_timeout,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Run one decision.
    ///
    /// `Ok` carries ALLOW or DENY. Every failure, including a timeout, is
    /// returned as a [`DecisionError`] and must be treated as a hard stop.
    pub async fn decide(&self, request: &VerificationRequest) -> Result<Outcome, DecisionError> {
        let decision_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "credential_decision",
            decision_id = %decision_id,
            username = %request.username,
        );

        let result = self.run(request).instrument(span).await;

        let (stage, result) = match result {
            Ok((stage, outcome)) => {
                tracing::debug!(%decision_id, %outcome, %stage, "decision complete");
                (stage, Ok(outcome))
            }
            Err(e) => {
                tracing::error!(
                    %decision_id,
                    username = %request.username,
                    stage = %e.stage,
                    error = %e,
                    "credential decision failed"
                );
                (e.stage, Err(e))
            }
        };

        self.audit
            .record(DecisionEvent::new(decision_id, &request.username, stage, &result));
        result
    }

    async fn run(
        &self,
        request: &VerificationRequest,
    ) -> Result<(DecisionStage, Outcome), DecisionError> {
        let username = request.username.as_str();

        self.check_identity(username).await?;
        tracing::trace!(stage = %DecisionStage::IdentityChecked, "identity confirmed");

        let stored = self.lookup(username).await?;
        tracing::trace!(stage = %DecisionStage::LookedUp, "credential retrieved");

        let Some(stored) = stored.into_value() else {
            tracing::warn!(username, "stored credential is null, denying");
            return Ok((DecisionStage::LookedUp, Outcome::Deny));
        };

        let Some(password) = request.password.as_ref() else {
            tracing::warn!(username, "no password submitted, denying");
            return Ok((DecisionStage::LookedUp, Outcome::Deny));
        };

        let identifier = self.config.transform.effective_identifier();
        let submitted = self
            .transforms
            .transform(identifier, password.expose_secret())
            .map_err(DecisionError::transform)?;
        tracing::trace!(
            stage = %DecisionStage::Transformed,
            transform = %identifier,
            "password transformed"
        );

        let outcome = if credentials_match(&stored, &submitted) {
            Outcome::Allow
        } else {
            tracing::warn!(username, "password mismatch");
            Outcome::Deny
        };
        Ok((DecisionStage::Compared, outcome))
    }

    async fn check_identity(&self, username: &str) -> Result<(), DecisionError> {
        let record = self
            .bounded(DecisionStage::Start, self.directory.find(username))
            .await?
            .map_err(DecisionError::identity_service)?;

        match record {
            Some(record) if record.active => Ok(()),
            Some(_) => {
                tracing::warn!(username, "identity is inactive");
                Err(DecisionError::user_not_found(DecisionStage::Start, username))
            }
            None => {
                tracing::warn!(username, "identity not found in directory");
                Err(DecisionError::user_not_found(DecisionStage::Start, username))
            }
        }
    }

    /// Acquire a connection, fetch the credential and release the connection
    /// whatever the fetch produced.
    async fn lookup(&self, username: &str) -> Result<StoredCredential, DecisionError> {
        let mut connection = self
            .bounded(
                DecisionStage::IdentityChecked,
                self.provider.acquire(&self.config.connection),
            )
            .await?
            .map_err(DecisionError::connection)?;
        tracing::trace!(stage = %DecisionStage::Connected, "connection acquired");

        let fetched = self
            .bounded(
                DecisionStage::Connected,
                fetch(connection.as_mut(), &self.config.query, username),
            )
            .await
            .and_then(|r| r.map_err(DecisionError::lookup));

        self.release(connection).await;
        fetched
    }

    async fn release(&self, connection: Box<dyn CredentialConnection>) {
        match tokio::time::timeout(self.call_timeout, connection.release()).await {
            Ok(Ok(())) => tracing::trace!("connection released"),
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to release connection"),
            Err(_) => tracing::warn!(
                timeout_ms = self.call_timeout.as_millis() as u64,
                "timed out releasing connection"
            ),
        }
    }

    async fn bounded<T>(
        &self,
        stage: DecisionStage,
        call: impl Future<Output = T>,
    ) -> Result<T, DecisionError> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| DecisionError::timed_out(stage, self.call_timeout))
    }
}

/// Exact, case-sensitive comparison in constant time.
fn credentials_match(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.as_bytes()).into()
}
