//! sitecfg-utils: Common utilities shared across sitecfg crates
//!
//! This crate provides:
//! - Unified error types ([`SitecfgError`], [`Result`])
//! - Logging infrastructure ([`init_logging`], [`LogConfig`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;

// Re-export main types at crate root for convenience
pub use error::{Result, SitecfgError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};

pub use paths::{config_dir, ensure_dir, log_dir, settings_file, state_dir};
