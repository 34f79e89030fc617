use crate::error::PayaraToolError;
use crate::output::warning;

use common::ErrorLocation;
use tooling_core::manager::ToolingManager;

use std::panic::Location;
use std::process::ExitCode;

#[track_caller]
pub(crate) fn interrupt_error(error: std::io::Error) -> PayaraToolError {
    PayaraToolError::Tool {
        message: format!("Failed to listen for Ctrl-C: {error}"),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Block until Ctrl-C.
pub(crate) async fn wait_for_interrupt() -> Result<(), PayaraToolError> {
    eprintln!("Following server.log, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.map_err(interrupt_error)
}

pub async fn run(manager: &ToolingManager, name: &str, follow: bool) -> Result<ExitCode, PayaraToolError> {
    if follow {
        manager.follow_server_log(name, true)?;
        wait_for_interrupt().await?;
        return Ok(ExitCode::SUCCESS);
    }

    if manager.read_server_log(name).await? == 0 {
        eprintln!("{}", warning(format!("server.log of '{name}' is empty or missing")));
    }
    Ok(ExitCode::SUCCESS)
}
