//! Logging configuration.
//!
//! Level and format names are mapped leniently: anything that is not one of
//! the recognized names falls back to the default (`info` and `json`). The
//! same mapping is used by serde, so a configuration file can never fail to
//! bind because of an unknown level or format string. Numbers and booleans
//! are read in their display form wherever a string is expected.

use std::fmt;
use std::path::PathBuf;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

/// Severity threshold for emitted records.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Maps a level name to a level. Unknown names (including the empty
    /// string) map to [`LogLevel::Info`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// The `tracing` level this threshold corresponds to.
    pub const fn as_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Filter that lets this level and everything more severe through.
    pub const fn as_filter(self) -> LevelFilter {
        LevelFilter::from_level(self.as_level())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(|name| Self::from_name(&name))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record encoding.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per record.
    #[default]
    Json,
    /// Single-line plain text records.
    Text,
}

impl LogFormat {
    /// Maps a format name to a format. Unknown names (including the empty
    /// string) map to [`LogFormat::Json`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Json,
        }
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl<'de> Deserialize<'de> for LogFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(|name| Self::from_name(&name))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Process standard output.
    Stdout,
    /// A file opened for append, created if missing.
    File(PathBuf),
}

impl LogOutput {
    /// Resolves an output target string. The empty string and `"stdout"`
    /// select standard output; anything else is a file path.
    pub fn from_target(target: &str) -> Self {
        match target {
            "" | "stdout" => Self::Stdout,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

/// Logging configuration (`log.*` keys).
///
/// # Example
///
/// ```
/// use keystone_telemetry::{LogConfig, LogFormat, LogLevel, LogOutput};
///
/// let config = LogConfig::from_raw("text", "verbose", "");
/// assert_eq!(config.format, LogFormat::Text);
/// assert_eq!(config.level, LogLevel::Info);
/// assert_eq!(config.target(), LogOutput::Stdout);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Record encoding (`json` or `text`).
    #[serde(default)]
    pub format: LogFormat,

    /// Severity threshold (`debug`, `info`, `warn`, `error`).
    #[serde(default)]
    pub level: LogLevel,

    /// Output target: empty or `stdout` for standard output, otherwise a file path.
    #[serde(default, deserialize_with = "lenient_string")]
    pub output: String,
}

impl LogConfig {
    /// Builds a configuration from raw, unvalidated strings.
    pub fn from_raw(format: &str, level: &str, output: &str) -> Self {
        Self {
            format: LogFormat::from_name(format),
            level: LogLevel::from_name(level),
            output: output.to_string(),
        }
    }

    /// Resolved output target.
    pub fn target(&self) -> LogOutput {
        LogOutput::from_target(&self.output)
    }
}

/// Deserializes a string field, also accepting a number or boolean in its
/// display form. Null reads as the empty string. Use with
/// `#[serde(deserialize_with = "lenient_string")]`.
///
/// # Errors
///
/// Fails on sequences and maps.
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarVisitor)
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("info"), LogLevel::Info);
        assert_eq!(LogLevel::from_name("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_name("error"), LogLevel::Error);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        for name in ["", "trace", "DEBUG", "warning", "fatal"] {
            assert_eq!(LogLevel::from_name(name), LogLevel::Info, "level {name:?}");
        }
    }

    #[test]
    fn test_level_ordering_matches_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(LogLevel::Warn.as_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Debug.as_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(LogFormat::from_name("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("text"), LogFormat::Text);
        for name in ["", "pretty", "Text", "logfmt"] {
            assert_eq!(LogFormat::from_name(name), LogFormat::Json, "format {name:?}");
        }
    }

    #[test]
    fn test_output_targets() {
        assert_eq!(LogOutput::from_target(""), LogOutput::Stdout);
        assert_eq!(LogOutput::from_target("stdout"), LogOutput::Stdout);
        assert_eq!(
            LogOutput::from_target("/var/log/keystone.log"),
            LogOutput::File(PathBuf::from("/var/log/keystone.log"))
        );
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.target(), LogOutput::Stdout);
    }

    #[test]
    fn test_deserialize_is_lenient() {
        let config: LogConfig =
            serde_json::from_str(r#"{"format": "xml", "level": "loud"}"#).unwrap();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_deserialize_scalar_values() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": 3, "format": true, "output": 8080}"#).unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, "8080");
    }

    #[test]
    fn test_deserialize_rejects_nested_level() {
        let result: Result<LogConfig, _> = serde_json::from_str(r#"{"level": ["debug"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "warn", "rotate": "daily"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
    }

    #[test]
    fn test_serialize_uses_canonical_names() {
        let config = LogConfig::from_raw("text", "warn", "app.log");
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["format"], "text");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["output"], "app.log");
    }
}
