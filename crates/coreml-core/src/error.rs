//! Error types for the CoreML export library.
//!
//! One structured error enum covers the whole surface: the external export
//! capability being unreachable, the export subprocess failing, bad request
//! input, and the usual filesystem/serialization failures.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The Ultralytics library could not be reached through the configured
    /// Python interpreter.
    #[error("Export capability unavailable: {message}")]
    MissingDependency { message: String },

    /// The export subprocess failed to start, crashed, or reported an error.
    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    /// Request input was rejected before any work started.
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    /// Export was cancelled by the user.
    #[error("Export cancelled")]
    Cancelled,

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ExportError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ExportError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create an IO error with an operation description and path context.
    pub fn io(context: &str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ExportError::Io {
            message: format!("{context}: {err}"),
            path: Some(path.into()),
            source: Some(err),
        }
    }
}

/// Extension trait attaching path context to `std::io` results.
pub trait IoResultExt<T> {
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| ExportError::io_with_path(e, path))
    }
}
