//! Merged key-value configuration.
//!
//! A [`ConfigSource`] holds the result of layering every configuration input
//! into one tree. It answers raw lookups by dotted key (`log.level`) and binds
//! the tree into typed [`Options`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use keystone_telemetry::LogConfig;

use crate::{ConfigError, Options};

/// Merged configuration tree produced by [`ConfigLoader::load`](crate::ConfigLoader::load).
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    tree: Value,
    layers: Vec<String>,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()), Vec::new())
    }
}

impl ConfigSource {
    pub(crate) fn new(tree: Value, layers: Vec<String>) -> Self {
        Self { tree, layers }
    }

    /// Descriptions of the layers merged into this source, lowest precedence first.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Looks up a value by dotted key.
    ///
    /// # Example
    ///
    /// ```
    /// use keystone_config::ConfigLoader;
    ///
    /// let source = ConfigLoader::new()
    ///     .with_override("log.level", "debug")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(source.get("log.level").and_then(|v| v.as_str()), Some("debug"));
    /// assert!(source.get("log.format").is_none());
    /// ```
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.tree, |node, part| node.as_object()?.get(part))
    }

    /// Looks up a value as a string.
    ///
    /// Strings are returned as-is, numbers and booleans in their display form;
    /// missing keys and any other value yield an empty string.
    pub fn get_string(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// Logging configuration read from the raw `log.*` lookups.
    ///
    /// Never fails: values that are missing or of the wrong type behave like
    /// empty strings and fall back to the logging defaults.
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_raw(
            &self.get_string("log.format"),
            &self.get_string("log.level"),
            &self.get_string("log.output"),
        )
    }

    /// Top-level keys that [`bind`](Self::bind) does not read.
    ///
    /// Configuration files may carry sections for other tools; they are
    /// ignored rather than rejected.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.tree
            .as_object()
            .map(|root| {
                root.keys()
                    .map(String::as_str)
                    .filter(|key| !Options::SECTIONS.contains(key))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Binds the tree into [`Options`].
    ///
    /// Absent keys take their defaults and unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Binding`] naming the dotted key whose value
    /// cannot be converted to the type of its field.
    pub fn bind(&self) -> Result<Options, ConfigError> {
        Ok(Options {
            log: self.section("log")?,
            mysql: self.section("mysql")?,
            toggle: self.section("toggle")?,
        })
    }

    fn section<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, ConfigError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => T::deserialize(value)
                .map_err(|e| ConfigError::binding(failing_key::<T>(key, value), e)),
        }
    }
}

/// Narrows a section-level failure to the first field that fails on its own.
/// Every section field has a default, so a one-field object binds exactly
/// when that field's value does.
fn failing_key<T: DeserializeOwned>(section: &str, value: &Value) -> String {
    value
        .as_object()
        .and_then(|fields| {
            fields.iter().find_map(|(name, field)| {
                let single = Value::Object(Map::from_iter([(name.clone(), field.clone())]));
                T::deserialize(&single)
                    .is_err()
                    .then(|| format!("{section}.{name}"))
            })
        })
        .unwrap_or_else(|| section.to_string())
}

/// Deep-merges `overlay` into `base`. Objects merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub(crate) fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Sets the value at a dotted key, creating or replacing intermediate objects.
pub(crate) fn set_path(tree: &mut Value, key: &str, value: Value) {
    let overlay = key.rsplit('.').fold(value, |inner, part| {
        let mut map = Map::new();
        map.insert(part.to_string(), inner);
        Value::Object(map)
    });
    merge(tree, overlay);
}

#[cfg(test)]
mod tests {
    use keystone_telemetry::{LogFormat, LogLevel};
    use serde_json::json;

    use super::*;

    fn source(tree: Value) -> ConfigSource {
        ConfigSource::new(tree, vec!["test".to_string()])
    }

    #[test]
    fn test_get_nested() {
        let source = source(json!({"mysql": {"addr": "db:3306"}}));
        assert_eq!(source.get("mysql.addr"), Some(&json!("db:3306")));
        assert_eq!(source.get("mysql.username"), None);
        assert_eq!(source.get("mysql.addr.port"), None);
    }

    #[test]
    fn test_get_string_coerces_scalars() {
        let source = source(json!({"log": {"level": 3, "format": true, "output": ["a"]}}));
        assert_eq!(source.get_string("log.level"), "3");
        assert_eq!(source.get_string("log.format"), "true");
        assert_eq!(source.get_string("log.output"), "");
        assert_eq!(source.get_string("missing"), "");
    }

    #[test]
    fn test_log_config_from_raw_values() {
        let source = source(json!({"log": {"level": "debug", "format": "text", "output": "app.log"}}));
        let config = source.log_config();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.output, "app.log");
    }

    #[test]
    fn test_log_config_defaults() {
        let config = ConfigSource::default().log_config();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_bind_empty_tree_gives_defaults() {
        assert_eq!(ConfigSource::default().bind().unwrap(), Options::default());
    }

    #[test]
    fn test_bind_values() {
        let source = source(json!({
            "log": {"level": "warn"},
            "mysql": {"max_open_connections": 5, "max_idle_connections": 2},
            "toggle": true
        }));
        let options = source.bind().unwrap();
        assert_eq!(options.log.level, LogLevel::Warn);
        assert_eq!(options.log.format, LogFormat::Json);
        assert_eq!(options.mysql.max_open_connections, 5);
        assert_eq!(options.mysql.max_idle_connections, 2);
        assert_eq!(options.mysql.addr, "127.0.0.1:3306");
        assert!(options.toggle);
    }

    #[test]
    fn test_bind_null_section_gives_defaults() {
        let options = source(json!({"log": null, "mysql": null})).bind().unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn test_bind_type_mismatch() {
        let err = source(json!({"toggle": "sometimes"})).bind().unwrap_err();
        match err {
            ConfigError::Binding { key, reason } => {
                assert_eq!(key, "toggle");
                assert!(reason.contains("boolean"), "reason: {reason}");
            }
            other => panic!("expected binding error, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_integer_mismatch_names_field() {
        let tree = json!({"mysql": {"addr": "db:3306", "max_open_connections": "many"}});
        match source(tree).bind().unwrap_err() {
            ConfigError::Binding { key, reason } => {
                assert_eq!(key, "mysql.max_open_connections");
                assert!(reason.contains("many"), "reason: {reason}");
            }
            other => panic!("expected binding error, got {other:?}"),
        }
    }

    #[test]
    fn test_bind_non_object_section() {
        let err = source(json!({"mysql": "db:3306"})).bind().unwrap_err();
        assert!(matches!(err, ConfigError::Binding { ref key, .. } if key == "mysql"));
    }

    #[test]
    fn test_bind_ignores_unknown_keys() {
        let source = source(json!({
            "server": {"addr": "0.0.0.0:8080"},
            "log": {"level": "debug", "rotate": "daily"},
            "mysql": {"charset": "utf8mb4"}
        }));
        let options = source.bind().unwrap();
        assert_eq!(options.log.level, LogLevel::Debug);
        assert_eq!(options.mysql, crate::MySqlOptions::default());
        assert_eq!(source.unknown_keys(), vec!["server"]);
    }

    #[test]
    fn test_bind_scalar_into_string_fields() {
        let options = source(json!({"mysql": {"password": 123456, "username": 42}}))
            .bind()
            .unwrap();
        assert_eq!(options.mysql.password, "123456");
        assert_eq!(options.mysql.username, "42");
    }

    #[test]
    fn test_merge_objects_deeply() {
        let mut base = json!({"log": {"level": "info", "format": "json"}, "toggle": false});
        merge(&mut base, json!({"log": {"level": "debug"}, "toggle": true}));
        assert_eq!(
            base,
            json!({"log": {"level": "debug", "format": "json"}, "toggle": true})
        );
    }

    #[test]
    fn test_merge_replaces_non_objects() {
        let mut base = json!({"log": "verbose"});
        merge(&mut base, json!({"log": {"level": "debug"}}));
        assert_eq!(base, json!({"log": {"level": "debug"}}));
    }

    #[test]
    fn test_set_path_creates_parents() {
        let mut tree = json!({});
        set_path(&mut tree, "mysql.addr", json!("db:3306"));
        set_path(&mut tree, "toggle", json!(true));
        assert_eq!(tree, json!({"mysql": {"addr": "db:3306"}, "toggle": true}));
    }

    #[test]
    fn test_set_path_replaces_scalar_parent() {
        let mut tree = json!({"log": "verbose"});
        set_path(&mut tree, "log.level", json!("debug"));
        assert_eq!(tree, json!({"log": {"level": "debug"}}));
    }
}
