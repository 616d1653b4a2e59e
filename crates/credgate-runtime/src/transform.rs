//! Password syntax transforms.
//!
//! A transform maps the submitted password into the syntax the credential
//! store keeps (for example an unsalted digest) before comparison. The stored
//! value is never transformed. Transforms are registered by identifier when the
//! process starts; identifiers are matched case-insensitively.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use credgate_core::CLEAR_TEXT_TRANSFORM;
use sha2::{Digest, Sha256, Sha512};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// A stateless password transform.
pub trait PasswordTransform: Send + Sync {
    fn apply(&self, input: &str) -> anyhow::Result<String>;
}

/// Errors raised while resolving or applying a transform.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("password transform '{0}' is not available")]
    Unavailable(String),

    #[error("password transform '{transform}' failed: {reason}")]
    Failed { transform: String, reason: String },
}

/// Identity mapping. Registered under [`CLEAR_TEXT_TRANSFORM`].
pub struct ClearText;

impl PasswordTransform for ClearText {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(input.to_string())
    }
}

/// Lowercase hex SHA-256 of the UTF-8 password.
pub struct Sha256Hex;

impl PasswordTransform for Sha256Hex {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(hex::encode(Sha256::digest(input.as_bytes())))
    }
}

/// Standard base64 SHA-256 of the UTF-8 password.
pub struct Sha256Base64;

impl PasswordTransform for Sha256Base64 {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(STANDARD.encode(Sha256::digest(input.as_bytes())))
    }
}

/// Lowercase hex SHA-512 of the UTF-8 password.
pub struct Sha512Hex;

impl PasswordTransform for Sha512Hex {
    fn apply(&self, input: &str) -> anyhow::Result<String> {
        Ok(hex::encode(Sha512::digest(input.as_bytes())))
    }
}

/// Maps transform identifiers to implementations.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Arc<dyn PasswordTransform>>,
}

impl TransformRegistry {
    /// An empty registry. Even the identity transform must be registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in transforms.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(CLEAR_TEXT_TRANSFORM, ClearText);
        registry.register("sha256-hex", Sha256Hex);
        registry.register("sha256-base64", Sha256Base64);
        registry.register("sha512-hex", Sha512Hex);
        registry
    }

    pub fn register(&mut self, identifier: &str, transform: impl PasswordTransform + 'static) {
        self.transforms
            .insert(normalize(identifier), Arc::new(transform));
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.transforms.contains_key(&normalize(identifier))
    }

    /// Registered identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn resolve(&self, identifier: &str) -> Result<Arc<dyn PasswordTransform>, TransformError> {
        self.transforms
            .get(&normalize(identifier))
            .cloned()
            .ok_or_else(|| TransformError::Unavailable(identifier.to_string()))
    }

    /// Resolve `identifier` and apply it to `input`.
    pub fn transform(&self, identifier: &str, input: &str) -> Result<String, TransformError> {
        let transform = self.resolve(identifier)?;
        let output = transform.apply(input).map_err(|e| TransformError::Failed {
            transform: identifier.to_string(),
            reason: e.to_string(),
        })?;
        tracing::trace!(transform = %identifier, "password transformed");
        Ok(output)
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_ascii_lowercase()
}
