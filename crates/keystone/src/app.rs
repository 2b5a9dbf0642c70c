//! Run orchestration.
//!
//! One run is strictly ordered: resolve sources, install the logger from the
//! raw `log.*` values, bind, validate, report. Any failure stops the run.

use anyhow::{Context, Result};
use keystone_config::{
    default_config_path, ConfigError, ConfigLoader, ConfigSource, Options, ENV_PREFIX,
};
use keystone_telemetry::{init_log, Logger};
use tracing::{debug, info};

use crate::cli::Cli;

/// Merges every configuration layer named by `cli`.
///
/// An explicit `--config` path must exist; the default path is optional.
///
/// # Errors
///
/// Returns `ConfigError` if a file cannot be read or parsed, or an
/// environment override has the wrong type.
pub fn load_source(cli: &Cli) -> Result<ConfigSource, ConfigError> {
    let loader = ConfigLoader::new().with_dotenv();
    let loader = match &cli.config {
        Some(path) => loader.with_file(path)?,
        None => loader.with_optional_file(default_config_path())?,
    };

    cli.apply_overrides(loader.with_env_prefix(ENV_PREFIX)).load()
}

/// Runs Keystone once and returns the validated options.
///
/// # Errors
///
/// Fails if configuration cannot be loaded, the log output cannot be opened,
/// or the options do not bind or validate.
pub fn run(cli: &Cli) -> Result<Options> {
    let source = load_source(cli)?;

    let logger = init_log(&source.log_config()).context("cannot initialize logging")?;
    for layer in source.layers() {
        debug!(%layer, "configuration layer loaded");
    }
    for key in source.unknown_keys() {
        debug!(%key, "ignoring unknown configuration key");
    }

    let options = source.bind()?;
    options.validate()?;

    report(&logger, &options)?;
    Ok(options)
}

/// Pretty JSON rendering of `options` with secrets masked.
pub fn render(options: &Options) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&options.redacted())
}

/// Emits the resolved options through `logger` at info level.
///
/// # Errors
///
/// Fails if the options cannot be serialized.
pub fn report(logger: &Logger, options: &Options) -> Result<()> {
    let rendered = render(options).context("cannot serialize options")?;
    logger.in_scope(|| info!("{rendered}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use keystone_telemetry::LogLevel;

    use super::*;

    #[test]
    fn test_render_masks_password() {
        let mut options = Options::default();
        options.mysql.password = "hunter2".to_string();

        let rendered = render(&options).unwrap();
        assert!(!rendered.contains("hunter2"));

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["mysql"]["password"], keystone_config::REDACTED);
        assert_eq!(value["log"]["level"], "info");
    }

    #[test]
    fn test_load_source_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystone.yaml");
        fs::write(&path, "log:\n  level: warn\n").unwrap();

        let cli = Cli {
            config: Some(path),
            log_format: Some("text".to_string()),
            ..Cli::default()
        };
        let source = load_source(&cli).unwrap();
        let config = source.log_config();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, keystone_telemetry::LogFormat::Text);
    }

    #[test]
    fn test_load_source_missing_explicit_file() {
        let cli = Cli {
            config: Some("/nonexistent/keystone.yaml".into()),
            ..Cli::default()
        };
        assert!(matches!(
            load_source(&cli),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_flag_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystone.json");
        fs::write(&path, r#"{"log": {"level": "error"}, "toggle": false}"#).unwrap();

        let cli = Cli {
            config: Some(path),
            toggle: true,
            log_level: Some("debug".to_string()),
            ..Cli::default()
        };
        let options = load_source(&cli).unwrap().bind().unwrap();
        assert_eq!(options.log.level, LogLevel::Debug);
        assert!(options.toggle);
    }
}
