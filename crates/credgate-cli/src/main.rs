use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "credgate", version, about = "Verify credentials against a SQL credential store")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide on one username/password pair. Prints ALLOW or DENY.
    ///
    /// Exit status is 0 for ALLOW, 1 for DENY and 2 when the decision failed.
    Verify {
        /// Path to the YAML configuration
        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        username: String,

        /// Read the password from this environment variable instead of stdin
        #[arg(long = "password-env")]
        password_env: Option<String>,
    },

    /// Load and validate a configuration file
    Check {
        #[arg(long)]
        config: PathBuf,
    },

    /// List the registered password transforms
    Transforms,
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries only the outcome
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.cmd {
        Command::Verify {
            config,
            username,
            password_env,
        } => commands::verify::run(&config, &username, password_env.as_deref()).await,
        Command::Check { config } => commands::check::run(&config),
        Command::Transforms => commands::transforms::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(commands::EXIT_FAILURE)
        }
    }
}
