//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use keystone_config::ConfigLoader;

/// Resolve the Keystone configuration and report it.
///
/// Configuration is read from a file, then environment variables
/// (`KEYSTONE__SECTION__KEY`), then the flags below; later sources win.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "keystone", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (YAML, TOML or JSON)
    /// [default: $HOME/.keystone/keystone.yaml]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Boolean switch recorded in the resolved options
    #[arg(short, long)]
    pub toggle: bool,

    /// Override log.level (debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Override log.format (json, text)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<String>,

    /// Override log.output (stdout or a file path)
    #[arg(long, value_name = "TARGET")]
    pub log_output: Option<String>,
}

impl Cli {
    /// Adds an override to `loader` for every flag given on the command line.
    #[must_use]
    pub fn apply_overrides(&self, mut loader: ConfigLoader) -> ConfigLoader {
        let flags = [
            ("log.level", &self.log_level),
            ("log.format", &self.log_format),
            ("log.output", &self.log_output),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                loader = loader.with_override(key, value.as_str());
            }
        }

        if self.toggle {
            loader = loader.with_override("toggle", true);
        }
        loader
    }
}
