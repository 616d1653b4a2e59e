//! `credgate check` command implementation.
//!
//! Loads the YAML configuration and validates it against the built-in
//! transform registry without touching the credential store.

use anyhow::{Context, Result};
use credgate_core::{ConnectionStrategy, NodeConfig};
use credgate_runtime::TransformRegistry;
use std::path::Path;
use std::process::ExitCode;

/// Load `config_path` and validate it.
pub fn load(config_path: &Path) -> Result<NodeConfig> {
    let config = NodeConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let transforms = TransformRegistry::builtin();
    config
        .validate(|id| transforms.contains(id))
        .with_context(|| format!("Invalid configuration in {:?}", config_path))?;
    Ok(config)
}

pub fn run(config_path: &Path) -> Result<ExitCode> {
    let config = load(config_path)?;

    match config.connection.strategy {
        ConnectionStrategy::Direct => println!(
            "connection: direct ({} as {})",
            config.connection.driver, config.connection.principal
        ),
        ConnectionStrategy::NamedResource => {
            println!("connection: named resource '{}'", config.connection.named_resource)
        }
    }
    println!("result column: {}", config.query.result_column);
    println!("transform: {}", config.transform.effective_identifier());
    println!("call timeout: {}ms", config.timeouts.call_timeout_ms);
    if !config.resources.is_empty() {
        let names: Vec<&str> = config.resources.keys().map(String::as_str).collect();
        println!("resources: {}", names.join(", "));
    }
    println!("configuration OK");

    Ok(ExitCode::SUCCESS)
}
