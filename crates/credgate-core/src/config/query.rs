//! Credential lookup and password transform configuration.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in identity transform.
pub const CLEAR_TEXT_TRANSFORM: &str = "clear-text";

/// The parameterized lookup executed against the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// SQL text with exactly one positional parameter, bound to the username.
    #[serde(default = "default_statement")]
    pub statement: String,

    /// Column holding the stored password.
    #[serde(default = "default_result_column")]
    pub result_column: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            statement: default_statement(),
            result_column: default_result_column(),
        }
    }
}

impl QueryConfig {
    /// Whether the statement carries a positional placeholder (`?` or `$1`).
    pub fn has_placeholder(&self) -> bool {
        self.statement.contains('?') || self.statement.contains("$1")
    }
}

/// Selects the transform applied to the submitted password before comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Registered transform identifier.
    #[serde(default = "default_transform")]
    pub transform: String,

    /// Fall back to the identity transform when `transform` is blank.
    #[serde(default = "default_true")]
    pub defaults_to_identity: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            transform: default_transform(),
            defaults_to_identity: true,
        }
    }
}

impl TransformConfig {
    /// Identifier to resolve at decision time.
    pub fn effective_identifier(&self) -> &str {
        let id = self.transform.trim();
        if id.is_empty() && self.defaults_to_identity {
            CLEAR_TEXT_TRANSFORM
        } else {
            id
        }
    }
}

fn default_statement() -> String {
    "select PASSWORD_COLUMN from TABLE where USERNAME_COLUMN = ?".to_string()
}

fn default_result_column() -> String {
    "PASSWORD_COLUMN".to_string()
}

fn default_transform() -> String {
    CLEAR_TEXT_TRANSFORM.to_string()
}

fn default_true() -> bool {
    true
}
