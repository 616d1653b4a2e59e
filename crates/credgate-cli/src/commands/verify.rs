//! `credgate verify` command implementation.

use anyhow::{Context, Result};
use credgate_adapter_sql::{ResourceRegistry, SqlConnectionProvider};
use credgate_core::{Outcome, VerificationRequest};
use credgate_runtime::{DecisionEngine, TracingAuditSink, TransformRegistry, directory_from_config};
use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_ALLOW, EXIT_DENY, EXIT_FAILURE};

pub async fn run(
    config_path: &Path,
    username: &str,
    password_env: Option<&str>,
) -> Result<ExitCode> {
    let config = super::check::load(config_path)?;
    tracing::debug!(
        config = ?config_path,
        strategy = ?config.connection.strategy,
        "configuration loaded"
    );
    let password = read_password(password_env).await?;

    let resources = ResourceRegistry::from_config(&config.resources)
        .context("Failed to register named resources")?;
    let directory = directory_from_config(&config.directory);
    let engine = DecisionEngine::new(
        config,
        directory,
        SqlConnectionProvider::new(resources),
        TransformRegistry::builtin(),
        TracingAuditSink,
    )
    .context("Invalid configuration")?;

    match engine.decide(&VerificationRequest::new(username, password)).await {
        Ok(outcome) => {
            println!("{}", outcome);
            Ok(ExitCode::from(exit_status(outcome)))
        }
        Err(e) => {
            eprintln!("{}", e.kind);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

fn exit_status(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Allow => EXIT_ALLOW,
        Outcome::Deny => EXIT_DENY,
    }
}

/// Password from `password_env`, or the first line of stdin read on the
/// blocking pool.
async fn read_password(password_env: Option<&str>) -> Result<String> {
    match password_env {
        Some(var) => std::env::var(var)
            .with_context(|| format!("Environment variable {} is not set", var)),
        None => tokio::task::spawn_blocking(|| first_line(std::io::stdin().lock()))
            .await
            .context("stdin reader task failed")?,
    }
}

fn first_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
