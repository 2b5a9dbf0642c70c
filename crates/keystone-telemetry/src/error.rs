//! Telemetry error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log output file could not be opened.
    ///
    /// This is treated as fatal by the binary: there is no fallback sink.
    #[error("failed to open log output {path}")]
    OpenOutput {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to install or replace the process-wide logger.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

impl TelemetryError {
    /// Create a new output open error.
    pub fn open_output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OpenOutput {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_open_output_display() {
        let err = TelemetryError::open_output(
            "/nonexistent/app.log",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        assert_eq!(err.to_string(), "failed to open log output /nonexistent/app.log");
        assert_eq!(err.source().unwrap().to_string(), "no such directory");
    }

    #[test]
    fn test_logging_init_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "failed to initialize logging: already set");
    }
}
