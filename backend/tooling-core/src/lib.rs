pub mod admin;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod log_view;
pub mod manager;
pub mod process;
pub mod registry;
pub mod status;


pub const TOOL_NAME: &str = "payara-tool";
pub const ADMIN_ENDPOINT_PREFIX: &str = "__asadmin";
pub const ADMIN_REQUESTED_BY: &str = const_format::concatcp!(TOOL_NAME, "/", env!("CARGO_PKG_VERSION"));
