//! Option validation.
//!
//! Rules are checked in a fixed order and the first violation is returned.
//! Logging options never fail validation: unknown level and format names
//! have already been mapped to their defaults during binding.

use crate::{ConfigError, MySqlOptions, Options};

impl Options {
    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first rule that fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mysql.validate()
    }
}

impl MySqlOptions {
    /// Validate the datastore settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if:
    /// - `addr` is not a `host:port` pair with a port in 1..=65535
    /// - `username` or `database` is empty
    /// - `max_open_connections` is zero
    /// - `max_idle_connections` exceeds `max_open_connections`
    /// - `max_connection_life_time_secs` is zero
    /// - `log_level` is outside 1..=4
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_addr(&self.addr)?;

        if self.username.is_empty() {
            return Err(ConfigError::validation("mysql.username", "must not be empty"));
        }

        if self.database.is_empty() {
            return Err(ConfigError::validation("mysql.database", "must not be empty"));
        }

        if self.max_open_connections == 0 {
            return Err(ConfigError::validation(
                "mysql.max_open_connections",
                "must be greater than 0",
            ));
        }

        if self.max_idle_connections > self.max_open_connections {
            return Err(ConfigError::validation(
                "mysql.max_idle_connections",
                format!(
                    "must not exceed mysql.max_open_connections ({} > {})",
                    self.max_idle_connections, self.max_open_connections
                ),
            ));
        }

        if self.max_connection_life_time_secs == 0 {
            return Err(ConfigError::validation(
                "mysql.max_connection_life_time_secs",
                "must be greater than 0",
            ));
        }

        if !(1..=4).contains(&self.log_level) {
            return Err(ConfigError::validation(
                "mysql.log_level",
                format!("must be between 1 and 4, got {}", self.log_level),
            ));
        }

        Ok(())
    }
}

fn validate_addr(addr: &str) -> Result<(), ConfigError> {
    if addr.is_empty() {
        return Err(ConfigError::validation("mysql.addr", "must not be empty"));
    }

    let Some((host, port)) = addr.rsplit_once(':') else {
        return Err(ConfigError::validation(
            "mysql.addr",
            format!("expected host:port, got {addr}"),
        ));
    };

    if host.is_empty() {
        return Err(ConfigError::validation(
            "mysql.addr",
            format!("missing host in {addr}"),
        ));
    }

    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok(()),
        _ => Err(ConfigError::validation(
            "mysql.addr",
            format!("invalid port in {addr}"),
        )),
    }
}
