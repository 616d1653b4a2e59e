//! Decision audit events and the sinks that record them.

use chrono::{DateTime, Utc};
use credgate_core::Outcome;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{DecisionError, DecisionErrorKind, DecisionStage};

/// Record of one finished decision. Never carries the password.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    pub decision_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub username: String,
    pub stage: DecisionStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DecisionErrorKind>,
}

impl DecisionEvent {
    pub fn new(
        decision_id: Uuid,
        username: &str,
        stage: DecisionStage,
        result: &Result<Outcome, DecisionError>,
    ) -> Self {
        Self {
            decision_id,
            occurred_at: Utc::now(),
            username: username.to_string(),
            stage,
            outcome: result.as_ref().ok().copied(),
            error: result.as_ref().err().map(|e| e.kind),
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: DecisionEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, event: DecisionEvent) {
        (**self).record(event);
    }
}

/// Emits decision events on the `credgate::audit` tracing target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: DecisionEvent) {
        tracing::info!(
            target: "credgate::audit",
            decision_id = %event.decision_id,
            username = %event.username,
            stage = %event.stage,
            outcome = ?event.outcome,
            error = ?event.error,
            "credential decision"
        );
    }
}
