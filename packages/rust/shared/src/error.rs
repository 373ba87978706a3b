//! Error types for plugindocs.
//!
//! Library crates use [`DocsBuildError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics and maps the
//! mandatory-artifact condition to its own exit status.

use std::path::PathBuf;

/// Top-level error type for all plugindocs operations.
///
/// Only fatal conditions live here. Per-plugin problems during
/// normalization are data, collected in
/// [`PluginErrors`](crate::PluginErrors), and never cross a stage boundary
/// as an error.
#[derive(Debug, thiserror::Error)]
pub enum DocsBuildError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Dependency descriptor could not be parsed.
    #[error("dependency file error: {message}")]
    DepsFile { message: String },

    /// Network/HTTP error while downloading an artifact.
    #[error("acquisition error: {0}")]
    Acquisition(String),

    /// The mandatory base platform artifact could not be acquired.
    /// Aborts the run before normalization with a distinct exit status.
    #[error("mandatory base artifact unavailable")]
    MandatoryArtifactUnavailable,

    /// Artifact installation error.
    #[error("install error: {0}")]
    Install(String),

    /// Raw-record extraction error.
    #[error("extract error: {message}")]
    Extract { message: String },

    /// Schema validation error for one plugin section.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Page rendering error (template expansion).
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsBuildError>;

impl DocsBuildError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a dependency-file error from any displayable message.
    pub fn deps_file(msg: impl Into<String>) -> Self {
        Self::DepsFile {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
