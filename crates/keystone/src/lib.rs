//! Keystone - a configuration-driven command-line skeleton.
//!
//! A run resolves configuration from layered sources, installs a structured
//! logger, binds and validates the options, and reports them:
//!
//! ```text
//!  file ─┐
//!   env ─┼─▶ ConfigSource ─▶ init_log(log.*) ─▶ bind ─▶ validate ─▶ report
//! flags ─┘
//! ```
//!
//! # Example Usage
//!
//! ```bash
//! # Defaults, or $HOME/.keystone/keystone.yaml if present
//! $ keystone
//!
//! # Explicit configuration file with a flag override
//! $ keystone --config ./keystone.yaml --log-format text
//!
//! # Environment override
//! $ KEYSTONE__LOG__LEVEL=debug keystone
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;

pub use app::run;
pub use cli::Cli;
