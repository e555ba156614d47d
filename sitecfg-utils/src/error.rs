//! Error types for sitecfg
//!
//! Provides a unified error type used across all sitecfg crates.

use std::path::PathBuf;

/// Main error type for sitecfg operations
#[derive(Debug, thiserror::Error)]
pub enum SitecfgError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Repository Errors ===

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource id not found: {0}")]
    ResourceIdNotFound(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Repository error: {0}")]
    Repository(String),

    // === Document Errors ===

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    // === Settings Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SitecfgError {
    /// Create a repository error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create a parse error for the document at `path`
    pub fn parse(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error means the resource no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound(_) | Self::ResourceIdNotFound(_)
        )
    }

    /// Check if this error means the document exists but is not a usable configuration
    pub fn is_invalid_document(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::InvalidDocument { .. })
    }
}

/// Result type alias using SitecfgError
pub type Result<T> = std::result::Result<T, SitecfgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SitecfgError::ResourceNotFound("/sites/default/a".into());
        assert_eq!(err.to_string(), "Resource not found: /sites/default/a");
    }

    #[test]
    fn test_not_found() {
        assert!(SitecfgError::ResourceIdNotFound("x".into()).is_not_found());
        assert!(!SitecfgError::UnknownResourceType("x".into()).is_not_found());
    }

    #[test]
    fn test_invalid_document() {
        let err = SitecfgError::parse("/a/.content/.config", "expected table");
        assert!(err.is_invalid_document());
        assert_eq!(
            err.to_string(),
            "Failed to parse /a/.content/.config: expected table"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: SitecfgError = io_err.into();
        assert!(matches!(err, SitecfgError::Io(_)));
    }
}
