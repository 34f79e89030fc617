//! Tool configuration stored as `{config_dir}/config.json`.
//!
//! Every knob has a default equal to the timing the server tooling has always
//! used, so a missing file is not an error.

use crate::TOOL_NAME;
use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const MAX_POOL_SIZE: usize = 64;

#[cfg(windows)]
const DEFAULT_LOG_READ_DELAY_MS: u64 = 1;
#[cfg(not(windows))]
const DEFAULT_LOG_READ_DELAY_MS: u64 = 100;

// ============================================
// CONFIG SECTIONS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LifecycleConfig {
    pub start_timeout_secs: u64,
    pub stop_timeout_secs: u64,
    pub restart_delay_secs: u64,
    pub kill_grace_ms: u64,
    pub kill_poll_ms: u64,
    pub wait_tick_ms: u64,
    pub worker_pool_size: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            start_timeout_secs: 300,
            stop_timeout_secs: 120,
            restart_delay_secs: 5,
            kill_grace_ms: 3_000,
            kill_poll_ms: 300,
            wait_tick_ms: 250,
            worker_pool_size: 5,
        }
    }
}

impl LifecycleConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }

    pub fn kill_poll(&self) -> Duration {
        Duration::from_millis(self.kill_poll_ms)
    }

    pub fn wait_tick(&self) -> Duration {
        Duration::from_millis(self.wait_tick_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusConfig {
    pub poll_interval_ms: u64,
    pub monitor_settle_ms: u64,
    pub connect_timeout_ms: u64,
    pub admin_timeout_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            monitor_settle_ms: 5_000,
            connect_timeout_ms: 2_000,
            admin_timeout_ms: 5_000,
        }
    }
}

impl StatusConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn monitor_settle(&self) -> Duration {
        Duration::from_millis(self.monitor_settle_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn admin_timeout(&self) -> Duration {
        Duration::from_millis(self.admin_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Lines longer than this skip the recognizer chain.
    pub max_recognized_line_len: usize,
    pub read_delay_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_recognized_line_len: 500,
            read_delay_ms: DEFAULT_LOG_READ_DELAY_MS,
        }
    }
}

impl LogConfig {
    pub fn read_delay(&self) -> Duration {
        Duration::from_millis(self.read_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolingConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            lifecycle: LifecycleConfig::default(),
            status: StatusConfig::default(),
            log: LogConfig::default(),
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// `{platform config dir}/payara-tool`.
#[track_caller]
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(TOOL_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
            reason: String::from("platform has no user configuration directory"),
        })
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ToolingConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ToolingConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is corrupted/invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ToolingConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// write or rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        let lifecycle = &self.lifecycle;
        if lifecycle.worker_pool_size == 0 || lifecycle.worker_pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid worker pool size: {} (must be 1-{MAX_POOL_SIZE})",
                    lifecycle.worker_pool_size
                ),
            });
        }

        let zero_durations = [
            ("lifecycle.start_timeout_secs", lifecycle.start_timeout_secs),
            ("lifecycle.stop_timeout_secs", lifecycle.stop_timeout_secs),
            ("lifecycle.kill_poll_ms", lifecycle.kill_poll_ms),
            ("lifecycle.wait_tick_ms", lifecycle.wait_tick_ms),
            ("status.poll_interval_ms", self.status.poll_interval_ms),
            ("status.connect_timeout_ms", self.status.connect_timeout_ms),
            ("status.admin_timeout_ms", self.status.admin_timeout_ms),
        ];
        if let Some((name, _)) = zero_durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("{name} must be greater than zero"),
            });
        }

        if self.log.max_recognized_line_len == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("log.max_recognized_line_len must be greater than zero"),
            });
        }

        Ok(())
    }
}
