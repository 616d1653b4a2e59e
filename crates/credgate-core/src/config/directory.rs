//! Identity directory configuration for standalone use.
//!
//! When the node runs inside a host flow the host supplies its own directory.
//! The CLI builds one from this section instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryMode {
    /// Every username exists and is active; the credential store decides.
    #[default]
    Open,
    /// Only the listed users exist.
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub username: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub mode: DirectoryMode,

    /// Users known to a static directory.
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
}

fn default_active() -> bool {
    true
}
