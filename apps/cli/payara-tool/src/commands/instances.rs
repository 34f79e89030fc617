use super::env_password;
use crate::cli::AddArgs;
use crate::error::PayaraToolError;
use crate::output::{accent, success, warning};

use tooling_core::manager::ToolingManager;

use std::process::ExitCode;

pub fn add(manager: &ToolingManager, args: AddArgs) -> Result<ExitCode, PayaraToolError> {
    let descriptor = args.descriptor(env_password())?;
    let remote = descriptor.is_remote();
    let instance = manager.register(descriptor)?;

    println!("{} {}", success("Registered"), accent(instance.name()));
    if remote {
        println!(
            "{}",
            warning("No local domains folder: start, kill and logs are unavailable")
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn list(manager: &ToolingManager) -> Result<ExitCode, PayaraToolError> {
    let instances = manager.instances();
    if instances.is_empty() {
        println!("No instances registered");
        return Ok(ExitCode::SUCCESS);
    }

    for instance in instances {
        let descriptor = instance.descriptor()?;
        let location = match descriptor.domain_dir() {
            Some(dir) if !descriptor.wsl => dir.display().to_string(),
            _ => "remote".to_string(),
        };
        println!(
            "{:<20} {}  {}",
            accent(&descriptor.name),
            descriptor.admin_base_url(),
            location
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn remove(manager: &ToolingManager, name: &str) -> Result<ExitCode, PayaraToolError> {
    let removed = manager.unregister(name)?;
    println!("{} {}", success("Removed"), accent(removed.name()));
    Ok(ExitCode::SUCCESS)
}
