// Library exports for testing
// The binary (main.rs) imports these as well

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod output;


/// Environment variable (or `.env` entry) holding the admin password.
pub const ADMIN_PASSWORD_ENV: &str = "PAYARA_ADMIN_PASSWORD";
