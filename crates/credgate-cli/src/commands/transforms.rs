//! `credgate transforms` command implementation.

use anyhow::Result;
use credgate_runtime::TransformRegistry;
use std::process::ExitCode;

pub fn run() -> Result<ExitCode> {
    for identifier in TransformRegistry::builtin().identifiers() {
        println!("{}", identifier);
    }
    Ok(ExitCode::SUCCESS)
}
