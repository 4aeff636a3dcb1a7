//! promptfish CLI entrypoint

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use promptfish::cli::Cli;

/// Conventional exit status after SIGINT
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so stdout stays clean for prompts and JSON)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse and execute CLI
    let cli = Cli::parse();

    tokio::select! {
        result = cli.execute() => match result {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // Dropping the run future removes any staged download
            eprintln!("\n{}", "Interrupted".yellow());
            ExitCode::from(INTERRUPTED)
        }
    }
}
