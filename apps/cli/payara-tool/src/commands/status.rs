use crate::error::PayaraToolError;
use crate::output::{accent, status_colored};

use tooling_core::manager::ToolingManager;

use std::process::ExitCode;

/// Poll one instance, or every registered one, and print status and state.
pub async fn run(manager: &ToolingManager, name: Option<&str>) -> Result<ExitCode, PayaraToolError> {
    let names: Vec<String> = match name {
        Some(name) => vec![name.to_string()],
        None => manager
            .instances()
            .iter()
            .map(|instance| instance.name().to_string())
            .collect(),
    };

    if names.is_empty() {
        println!("No instances registered");
        return Ok(ExitCode::SUCCESS);
    }

    for name in names {
        let status = manager.status(&name).await?;
        let state = manager.state(&name)?;
        println!("{:<20} {} {}", accent(&name), status_colored(status), state);
    }
    Ok(ExitCode::SUCCESS)
}
