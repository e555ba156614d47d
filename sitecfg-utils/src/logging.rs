//! Logging infrastructure for sitecfg
//!
//! Provides unified logging setup using the tracing ecosystem.

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::{paths, Result, SitecfgError};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SITECFG_LOG";

const LOG_FILE: &str = "sitecfg.log";

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr (for the CLI)
    Stderr,
    /// Log to file (for long-running watch mode)
    File,
    /// Log to both stderr and file
    Both,
}

impl LogOutput {
    fn includes_stderr(self) -> bool {
        matches!(self, Self::Stderr | Self::Both)
    }

    fn includes_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g., "info", "debug", "sitecfg_engine=debug,notify=warn")
    pub filter: String,
    /// Include span events (enter/exit)
    pub span_events: bool,
    /// Include file/line in logs
    pub file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            span_events: false,
            file_line: false,
        }
    }
}

impl LogConfig {
    /// One-shot CLI commands: stderr, warnings unless `SITECFG_LOG` says otherwise
    pub fn cli() -> Self {
        Self {
            filter: filter_from_env("warn"),
            ..Self::default()
        }
    }

    /// Long-running `sitecfg watch`: stderr and the log file
    pub fn watcher() -> Self {
        Self {
            output: LogOutput::Both,
            filter: filter_from_env("info"),
            span_events: false,
            file_line: true,
        }
    }

    /// Create config for development (verbose stderr)
    pub fn development() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "debug".into(),
            span_events: true,
            file_line: true,
        }
    }
}

fn filter_from_env(fallback: &str) -> String {
    std::env::var(LOG_ENV).unwrap_or_else(|_| fallback.to_string())
}

/// Initialize logging with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with custom configuration
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| SitecfgError::config(format!("Invalid log filter: {}", e)))?;

    let span_events = if config.span_events {
        FmtSpan::ENTER | FmtSpan::EXIT
    } else {
        FmtSpan::NONE
    };

    let stderr_layer = config.output.includes_stderr().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events.clone())
            .with_file(config.file_line)
            .with_line_number(config.file_line)
    });

    let file_layer = if config.output.includes_file() {
        let file = open_log_file()?;
        Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_span_events(span_events)
                .with_file(config.file_line)
                .with_line_number(config.file_line),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SitecfgError::internal(format!("Failed to init logging: {}", e)))
}

/// Append-mode `sitecfg.log` in the log directory
fn open_log_file() -> Result<File> {
    let dir = paths::log_dir();
    paths::ensure_dir(&dir).map_err(|e| SitecfgError::FileWrite {
        path: dir.clone(),
        source: e,
    })?;

    let path = dir.join(LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| SitecfgError::FileWrite { path, source: e })
}
