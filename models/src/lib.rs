//! Domain models for the Payara tooling.
//!
//! This crate contains pure data structures representing the core
//! concepts of server tooling. Models have no behaviour beyond validation and
//! conversion - they're just data passed between layers.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **tooling-core**: Status polling, lifecycle tasks, log parsing, registry
//! - **payara-tool**: Command line wiring everything together

pub mod error;
pub mod log_record;
pub mod server_instance;
pub mod server_state;
pub mod task;

#[cfg(test)]
mod tests;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use log_record::{LogLevel, LogRecord};
pub use server_instance::builder::ServerInstanceBuilder;
pub use server_instance::{JvmMode, ServerInstance};
pub use server_state::{ServerState, ServerStatus, StateChange};
pub use task::{TaskEvent, TaskState};
