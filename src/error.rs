//! Error types for libcheck operations.
//!
//! This module defines [`LibcheckError`], the error type for failures that
//! abort a run, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Per-file extraction problems are not errors at this level; they are
//!   reported as skipped files (see [`crate::metadata::ExtractError`])
//! - Per-reference problems are findings, counted in the audit report
//! - `LibcheckError` is reserved for conditions that stop the whole run

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for libcheck operations.
#[derive(Debug, Error)]
pub enum LibcheckError {
    /// The library root could not be enumerated.
    #[error("Cannot read library directory {path}: {source}")]
    RootEnumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file not found at the given location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A name pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// No name patterns were supplied.
    #[error("At least one module name pattern is required")]
    NoPatterns,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for libcheck operations.
pub type Result<T> = std::result::Result<T, LibcheckError>;
