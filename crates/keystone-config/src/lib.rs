//! Layered configuration for Keystone.
//!
//! This crate resolves the runtime [`Options`] of a Keystone process:
//! - YAML, TOML and JSON configuration files
//! - Environment variable overrides
//! - Explicit overrides from command-line flags
//! - Binding that ignores unknown keys and fails on mistyped values, naming the key
//! - Validation that reports the first failing rule
//!
//! # Example
//!
//! ```no_run
//! use keystone_config::{default_config_path, ConfigLoader, ENV_PREFIX};
//!
//! # fn main() -> Result<(), keystone_config::ConfigError> {
//! let source = ConfigLoader::new()
//!     .with_optional_file(default_config_path())?
//!     .with_env_prefix(ENV_PREFIX)
//!     .load()?;
//!
//! let options = source.bind()?;
//! options.validate()?;
//! println!("datastore at {}", options.mysql.addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```yaml
//! log:
//!   format: json        # json | text
//!   level: info         # debug | info | warn | error
//!   output: stdout      # empty, stdout, or a file path
//!
//! mysql:
//!   addr: 127.0.0.1:3306
//!   username: keystone
//!   password: ""
//!   database: keystone
//!   max_idle_connections: 100
//!   max_open_connections: 100
//!   max_connection_life_time_secs: 10
//!   log_level: 1
//! ```
//!
//! # Environment Variable Overrides
//!
//! Known keys can be overridden with variables of the form
//! `PREFIX__SECTION__KEY`:
//!
//! - `KEYSTONE__LOG__LEVEL=debug`
//! - `KEYSTONE__MYSQL__ADDR=db.internal:3306`
//! - `KEYSTONE__TOGGLE=true`

#![warn(missing_docs)]

mod error;
mod loader;
mod options;
mod source;
mod validate;

pub use error::ConfigError;
pub use loader::{
    default_config_path, ConfigLoader, FileFormat, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE,
    ENV_PREFIX,
};
pub use options::{MySqlOptions, Options, REDACTED};
pub use source::ConfigSource;
