//! Credential decision runtime: engine, password transforms, identity and audit.

pub mod audit;
pub mod engine;
pub mod error;
pub mod identity;
pub mod node;
pub mod transform;

pub use audit::{AuditSink, DecisionEvent, TracingAuditSink};
pub use engine::DecisionEngine;
pub use error::{DecisionError, DecisionErrorKind, DecisionStage};
pub use identity::{
    IdentityDirectory, IdentityRecord, OpenDirectory, StaticDirectory, directory_from_config,
};
pub use node::DecisionNode;
pub use transform::{
    ClearText, PasswordTransform, Sha256Base64, Sha256Hex, Sha512Hex, TransformError,
    TransformRegistry,
};
