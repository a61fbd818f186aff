#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::process;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "cairn_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "cairn_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "cairn_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    telemetry::init_tracing(cli.verbose)?;
    cli.log();

    match cli.command {
        Command::Store(args) => commands::store(args, cli.verbose).await,
        Command::Download(args) => commands::download(args, cli.verbose).await,
        Command::Test(args) => commands::probe(args, cli.verbose).await,
    }
}
