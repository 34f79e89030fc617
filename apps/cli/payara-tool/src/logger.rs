//! Logging for the payara-tool CLI.
//!
//! Provides dual output (stderr with colors + file) with thread-safe initialization.
//! Stdout is left to command output and server log lines.

use crate::error::PayaraToolError;

use common::ErrorLocation;

use std::io::stderr;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub(crate) const LOG_FILE_NAME: &str = "payara-tool.log";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with console level: ";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Level of the log file in debug builds.
#[cfg(debug_assertions)]
const FILE_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Level of the log file in release builds.
#[cfg(not(debug_assertions))]
const FILE_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// HTTP stack crates that are only interesting when something is broken.
const QUIET_MODULES: [&str; 3] = ["reqwest", "hyper_util", "rustls"];

/// Console level for `-v` repetitions.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize the logger with dual output (stderr + file in `log_dir`).
///
/// Safe to call multiple times; later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or the dispatch
/// cannot be installed.
pub fn initialize(log_dir: &Path, console_level: LevelFilter) -> Result<(), PayaraToolError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = build_dispatch(log_dir, console_level).and_then(|dispatch| {
            dispatch.apply().map_err(|e| PayaraToolError::Logger {
                message: format!("Failed to initialize logger: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
        });
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{console_level:?}");
        }
    });

    result
}

/// Build the stderr + file dispatch without installing it.
#[track_caller]
pub(crate) fn build_dispatch(log_dir: &Path, console_level: LevelFilter) -> Result<Dispatch, PayaraToolError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let mut base_dispatch = Dispatch::new().level(console_level.max(FILE_LOG_LEVEL));
    for module in QUIET_MODULES {
        base_dispatch = base_dispatch.level_for(module, LevelFilter::Warn);
    }

    let console_dispatch = Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message}",
                date = format_rfc3339(SystemTime::now()),
                level = color_configuration.color(record.level()),
                message = message,
            ))
        })
        .chain(stderr());

    let file_dispatch = Dispatch::new()
        .level(FILE_LOG_LEVEL)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| PayaraToolError::Logger {
                message: format!("Failed to create log file {}: {e}", log_file_path.display()),
                location: ErrorLocation::from(Location::caller()),
            })?,
        );

    Ok(base_dispatch.chain(console_dispatch).chain(file_dispatch))
}
