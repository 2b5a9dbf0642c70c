//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for combining configuration from
//! files, environment variables and explicit overrides into a
//! [`ConfigSource`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::source::{merge, set_path};
use crate::{ConfigError, ConfigSource};

/// Environment variable prefix used by the binary.
pub const ENV_PREFIX: &str = "KEYSTONE";

/// File name looked up by [`default_config_path`].
pub const DEFAULT_CONFIG_FILE: &str = "keystone.yaml";

/// Directory under the home directory holding [`DEFAULT_CONFIG_FILE`].
pub const DEFAULT_CONFIG_DIR: &str = ".keystone";

/// Default configuration file location.
///
/// `$HOME/.keystone/keystone.yaml`, or `./keystone.yaml` when no home
/// directory can be determined.
pub fn default_config_path() -> PathBuf {
    home::home_dir().map_or_else(
        || PathBuf::from(DEFAULT_CONFIG_FILE),
        |home| home.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
    )
}

/// Configuration document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// TOML (`.toml`).
    Toml,
    /// JSON (`.json`).
    Json,
}

impl FileFormat {
    /// Format named by a file extension, if supported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("yaml" | "yml") => Some(Self::Yaml),
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }

    fn parse(self, content: &str, origin: &str) -> Result<Value, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let value: Value = match self {
            Self::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::parse(origin, e))?
            }
            Self::Toml => toml::from_str(content).map_err(|e| ConfigError::parse(origin, e))?,
            Self::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::parse(origin, e))?
            }
        };

        match value {
            Value::Object(_) => Ok(value),
            Value::Null => Ok(Value::Object(Map::new())),
            _ => Err(ConfigError::parse(origin, "top level must be a mapping")),
        }
    }
}

/// Kind of value a known key holds, used to type environment overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    String,
    Bool,
    Integer,
}

fn key_kind(key: &str) -> Option<KeyKind> {
    match key {
        "log.format" | "log.level" | "log.output" | "mysql.addr" | "mysql.username"
        | "mysql.password" | "mysql.database" => Some(KeyKind::String),
        "toggle" => Some(KeyKind::Bool),
        "mysql.max_idle_connections"
        | "mysql.max_open_connections"
        | "mysql.max_connection_life_time_secs"
        | "mysql.log_level" => Some(KeyKind::Integer),
        _ => None,
    }
}

/// Configuration loader with layered approach.
///
/// Layers are applied in this order, later layers overriding earlier ones:
/// 1. Configuration files, in the order they were added
/// 2. Environment variables (`PREFIX__SECTION__KEY`)
/// 3. Explicit overrides (command-line flags)
///
/// Keys absent from every layer take the defaults of
/// [`Options`](crate::Options) when the source is bound.
///
/// # Example
///
/// ```no_run
/// use keystone_config::{default_config_path, ConfigLoader, ENV_PREFIX};
///
/// # fn main() -> Result<(), keystone_config::ConfigError> {
/// let source = ConfigLoader::new()
///     .with_optional_file(default_config_path())?
///     .with_env_prefix(ENV_PREFIX)
///     .with_override("log.level", "debug")
///     .load()?;
///
/// let options = source.bind()?;
/// options.validate()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    tree: Value,
    layers: Vec<String>,
    env_prefix: Option<String>,
    overrides: Vec<(String, Value)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with no layers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Value::Object(Map::new()),
            layers: Vec::new(),
            env_prefix: None,
            overrides: Vec::new(),
        }
    }

    /// Merge a configuration file.
    ///
    /// The format is chosen by extension: `.yaml`/`.yml`, `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is not a supported format
    /// - The content cannot be parsed
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format =
            FileFormat::from_path(path).ok_or_else(|| ConfigError::unsupported_format(path))?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;

        let origin = path.display().to_string();
        merge(&mut self.tree, format.parse(&content, &origin)?);
        self.layers.push(format!("file {origin}"));

        Ok(self)
    }

    /// Merge a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merge configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use keystone_config::{ConfigLoader, FileFormat};
    ///
    /// let yaml = "log:\n  level: debug\n";
    ///
    /// let source = ConfigLoader::new()
    ///     .with_string(yaml, FileFormat::Yaml)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(source.get_string("log.level"), "debug");
    /// ```
    pub fn with_string(mut self, content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        merge(&mut self.tree, format.parse(content, "string")?);
        self.layers.push(format!("{format:?} string").to_lowercase());
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `KEYSTONE__LOG__LEVEL=debug` or `KEYSTONE__MYSQL__MAX_OPEN_CONNECTIONS=50`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Set a value by dotted key. Overrides take precedence over every
    /// other layer; the last override for a key wins.
    #[must_use]
    pub fn with_override(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Finalize the layers into a [`ConfigSource`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Binding`] if an environment variable for a known
    /// key cannot be parsed as that key's type.
    pub fn load(mut self) -> Result<ConfigSource, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars = env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
            self.apply_env(&prefix, vars)?;
        }

        if !self.overrides.is_empty() {
            for (key, value) in std::mem::take(&mut self.overrides) {
                set_path(&mut self.tree, &key, value);
            }
            self.layers.push("overrides".to_string());
        }

        Ok(ConfigSource::new(self.tree, self.layers))
    }

    // Apply every variable under the prefix
    fn apply_env<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = false;
        for (key, value) in vars {
            applied |= self.apply_env_var(&key, &value, prefix)?;
        }

        if applied {
            self.layers.push(format!("environment {prefix}__*"));
        }
        Ok(())
    }

    // Apply a single environment variable; returns whether it named a known key
    fn apply_env_var(&mut self, var: &str, value: &str, prefix: &str) -> Result<bool, ConfigError> {
        let Some(rest) = var.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(false);
        };

        let key = rest.split("__").collect::<Vec<_>>().join(".").to_lowercase();
        let Some(kind) = key_kind(&key) else {
            return Ok(false);
        };

        let typed = match kind {
            KeyKind::String => Value::String(value.to_string()),
            KeyKind::Bool => Value::Bool(
                parse_bool(value).ok_or_else(|| ConfigError::binding(var, "expected boolean"))?,
            ),
            KeyKind::Integer => Value::from(
                value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::binding(var, "expected non-negative integer"))?,
            ),
        };

        set_path(&mut self.tree, &key, typed);
        Ok(true)
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
