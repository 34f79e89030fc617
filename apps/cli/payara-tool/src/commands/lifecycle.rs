use super::logs::wait_for_interrupt;
use crate::error::PayaraToolError;
use crate::output::ProgressPrinter;

use tooling_core::lifecycle::TaskHandle;
use tooling_core::lifecycle::task::{Operation, TaskListener};
use tooling_core::manager::ToolingManager;

use models::TaskState;

use std::process::ExitCode;
use std::sync::Arc;

use log::info;

fn printer(operation: Operation) -> Vec<Arc<dyn TaskListener>> {
    vec![Arc::new(ProgressPrinter::new(operation))]
}

pub(crate) fn exit_code(state: TaskState) -> ExitCode {
    match state {
        TaskState::Failed => ExitCode::FAILURE,
        TaskState::Running | TaskState::Completed => ExitCode::SUCCESS,
    }
}

/// Wait for the task; with `follow`, tail server.log once it completed.
async fn finish(
    manager: &ToolingManager,
    handle: TaskHandle,
    follow: bool,
) -> Result<ExitCode, PayaraToolError> {
    let name = handle.instance().to_string();
    let state = handle.wait().await;
    info!("Task for '{name}' finished as {state}");

    if follow && state == TaskState::Completed {
        manager.follow_server_log(&name, false)?;
        wait_for_interrupt().await?;
    }
    Ok(exit_code(state))
}

pub async fn start(manager: &ToolingManager, name: &str, follow: bool) -> Result<ExitCode, PayaraToolError> {
    let handle = manager.start(name, &printer(Operation::Start))?;
    finish(manager, handle, follow).await
}

pub async fn stop(manager: &ToolingManager, name: &str) -> Result<ExitCode, PayaraToolError> {
    let handle = manager.stop(name, &printer(Operation::Stop))?;
    finish(manager, handle, false).await
}

pub async fn restart(manager: &ToolingManager, name: &str, follow: bool) -> Result<ExitCode, PayaraToolError> {
    let handle = manager.restart(name, &printer(Operation::Restart))?;
    finish(manager, handle, follow).await
}

pub async fn kill(manager: &ToolingManager, name: &str) -> Result<ExitCode, PayaraToolError> {
    let handle = manager.kill(name, &printer(Operation::Kill))?;
    finish(manager, handle, false).await
}
