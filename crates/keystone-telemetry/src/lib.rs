//! Structured logging setup for Keystone.
//!
//! This crate turns a [`LogConfig`] into a `tracing` subscriber:
//!
//! - **Level**: `debug`, `info`, `warn`, `error`; anything else means `info`
//! - **Format**: `json` or `text`; anything else means `json`
//! - **Output**: empty or `stdout` for standard output, otherwise a file
//!   opened for appending
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐    ┌─────────────────────────────────────┐
//! │   LogConfig   │───▶│ Registry                            │
//! │ format/level/ │    │  ├─ LevelFilter        (reloadable) │
//! │ output        │    │  └─ fmt layer json|text (reloadable)│
//! └───────────────┘    └──────────────────┬──────────────────┘
//!                                         │
//!                                         ▼
//!                                  ┌─────────────┐
//!                                  │ stdout/file │
//!                                  └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use keystone_telemetry::{init_log, LogConfig};
//!
//! let logger = init_log(&LogConfig::default())?;
//! logger.in_scope(|| tracing::info!("ready"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{lenient_string, LogConfig, LogFormat, LogLevel, LogOutput};
pub use error::TelemetryError;
pub use logging::{init_log, Logger};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
