//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, binding or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported configuration file format: {path}")]
    UnsupportedFormat {
        /// Path to the file.
        path: PathBuf,
    },

    /// The document could not be parsed.
    #[error("failed to parse configuration from {origin}: {reason}")]
    Parse {
        /// File path or other description of where the document came from.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A configured value could not be converted to its declared type.
    #[error("failed to bind configuration key {key}: {reason}")]
    Binding {
        /// The key (or environment variable) holding the value.
        key: String,
        /// Explanation of the mismatch.
        reason: String,
    },

    /// A bound value violates a validation rule.
    #[error("invalid configuration value for {field}: {reason}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// The rule that was violated.
        reason: String,
    },
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Create a new parse error.
    pub fn parse(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new binding error.
    pub fn binding(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Binding {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
