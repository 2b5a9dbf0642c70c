//! Runtime options.
//!
//! [`Options`] is produced once per run by [`ConfigSource::bind`](crate::ConfigSource::bind),
//! checked by [`Options::validate`], and only read afterwards.

use keystone_telemetry::{lenient_string, LogConfig};
use serde::{Deserialize, Serialize};

/// Placeholder shown instead of a configured password.
pub const REDACTED: &str = "******";

/// Complete Keystone runtime options.
///
/// # Example
///
/// ```
/// use keystone_config::Options;
///
/// let options = Options::default();
/// assert_eq!(options.mysql.addr, "127.0.0.1:3306");
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Options {
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Datastore connection settings.
    #[serde(default)]
    pub mysql: MySqlOptions,

    /// Value of the `--toggle` flag. Has no effect on behavior.
    #[serde(default)]
    pub toggle: bool,
}

impl Options {
    /// Top-level keys read by binding; any other key is ignored.
    pub const SECTIONS: [&'static str; 3] = ["log", "mysql", "toggle"];

    /// Copy suitable for printing: a non-empty password is masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut options = self.clone();
        if !options.mysql.password.is_empty() {
            options.mysql.password = REDACTED.to_string();
        }
        options
    }
}

/// MySQL connection settings (`mysql.*` keys).
///
/// String fields also accept numbers and booleans, so `password: 123456`
/// binds as `"123456"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MySqlOptions {
    /// Server address as `host:port`.
    #[serde(default = "default_addr", deserialize_with = "lenient_string")]
    pub addr: String,

    /// Login user.
    #[serde(default = "default_username", deserialize_with = "lenient_string")]
    pub username: String,

    /// Login password.
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: String,

    /// Database name.
    #[serde(default = "default_database", deserialize_with = "lenient_string")]
    pub database: String,

    /// Maximum idle connections kept in the pool.
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: u32,

    /// Maximum open connections.
    #[serde(default = "default_max_open_connections")]
    pub max_open_connections: u32,

    /// Maximum lifetime of a pooled connection, in seconds.
    #[serde(default = "default_max_connection_life_time")]
    pub max_connection_life_time_secs: u64,

    /// Driver log verbosity, 1 (silent) to 4 (info).
    #[serde(default = "default_log_level")]
    pub log_level: u8,
}

impl Default for MySqlOptions {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            username: default_username(),
            password: String::new(),
            database: default_database(),
            max_idle_connections: default_max_idle_connections(),
            max_open_connections: default_max_open_connections(),
            max_connection_life_time_secs: default_max_connection_life_time(),
            log_level: default_log_level(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:3306".to_string()
}

fn default_username() -> String {
    "keystone".to_string()
}

fn default_database() -> String {
    "keystone".to_string()
}

fn default_max_idle_connections() -> u32 {
    100
}

fn default_max_open_connections() -> u32 {
    100
}

fn default_max_connection_life_time() -> u64 {
    10
}

fn default_log_level() -> u8 {
    1
}
