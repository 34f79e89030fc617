use payara_tool::cli::Cli;
use payara_tool::commands;
use payara_tool::error::PayaraToolError;
use payara_tool::logger::initialize as LoggerInitialize;
use payara_tool::output::style_error;

use common::ErrorLocation;
use tooling_core::config::default_config_dir;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

fn resolve_config_dir(cli: &Cli) -> Result<PathBuf, PayaraToolError> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };

    create_dir_all(&dir).map_err(|e| PayaraToolError::Tool {
        message: format!("Failed to create config directory {}: {e}", dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;
    Ok(dir)
}

async fn run(cli: Cli) -> Result<ExitCode, PayaraToolError> {
    let config_dir = resolve_config_dir(&cli)?;

    // Initialize logger FIRST
    LoggerInitialize(&config_dir, cli.log_level())?;
    info!("payara-tool {} starting", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());

    commands::run(cli.command, &config_dir).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", style_error(e.to_string()));
            ExitCode::FAILURE
        }
    }
}
