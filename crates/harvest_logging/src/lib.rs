#![deny(missing_docs)]
//! Shared logging utilities for the thread harvest workspace.
//!
//! This crate provides the `harvest_*` logging macros used by the extraction
//! engine and the binary, the process logger setup, and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use thiserror::Error;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! harvest_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Write to the configured log file only.
    File,
    /// Write to the terminal only.
    #[default]
    Terminal,
    /// Write to both the log file and the terminal.
    Both,
}

/// Logger setup that did not fully succeed.
#[derive(Debug, Error)]
pub enum LogSetupError {
    /// The log file could not be created. Any terminal logger is still installed.
    #[error("could not create log file at {path:?}")]
    LogFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A global logger was already installed.
    #[error("a global logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Initialize the process logger.
///
/// File output goes to `log_file` (or `./run.log` when `None`). When the log
/// file cannot be created, the remaining loggers are still installed and the
/// file failure is returned.
pub fn initialize(
    destination: LogDestination,
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<(), LogSetupError> {
    let (loggers, file_error) = build_loggers(destination, level, log_file);
    if !loggers.is_empty() {
        CombinedLogger::init(loggers)?;
    }
    file_error.map_or(Ok(()), Err)
}

fn build_loggers(
    destination: LogDestination,
    level: LevelFilter,
    log_file: Option<&Path>,
) -> (Vec<Box<dyn SharedLogger>>, Option<LogSetupError>) {
    let config = build_config();
    let path = log_file.unwrap_or_else(|| Path::new("./run.log"));

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    let mut file_error = None;
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match create_file_logger(level, config, path) {
            Ok(file_logger) => loggers.push(file_logger),
            Err(err) => file_error = Some(err),
        }
    }
    (loggers, file_error)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Result<Box<WriteLogger<File>>, LogSetupError> {
    let file = File::create(path).map_err(|source| LogSetupError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(WriteLogger::new(level, config, file))
}

/// Installs a terminal logger for test binaries. Debug level in debug
/// builds, info otherwise.
///
/// Safe to call from every test: only the first call in a process installs a
/// logger.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        build_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
