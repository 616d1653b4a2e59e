//! Authentication-tree node wrapper around the decision engine.

use async_trait::async_trait;
use credgate_core::{FlowState, Outcome};

use crate::audit::AuditSink;
use crate::engine::DecisionEngine;
use crate::error::{DecisionError, DecisionStage};
use credgate_adapter_sql::ConnectionProvider;

/// A step of a host authentication flow that reads credentials from the
/// flow state and yields an outcome.
#[async_trait]
pub trait DecisionNode: Send + Sync {
    async fn process(&self, state: &FlowState) -> Result<Outcome, DecisionError>;
}

#[async_trait]
impl<P: ConnectionProvider, S: AuditSink> DecisionNode for DecisionEngine<P, S> {
    async fn process(&self, state: &FlowState) -> Result<Outcome, DecisionError> {
        let Some(request) = state.to_request() else {
            tracing::error!("no username in shared state");
            return Err(DecisionError::user_not_found(DecisionStage::Start, ""));
        };
        self.decide(&request).await
    }
}
