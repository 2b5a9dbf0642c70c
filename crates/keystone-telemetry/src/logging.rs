//! Structured logging for Keystone.
//!
//! A [`Logger`] is an explicitly constructed `tracing` dispatcher built from a
//! [`LogConfig`]: a level filter, a JSON or text formatter, and a writer for
//! the configured output. [`init_log`] builds one and installs it as the
//! process-wide default so that plain `tracing` macros write through it.
//!
//! Installing is last-call-wins. The first call registers a subscriber whose
//! filter and formatter sit behind reload handles; later calls swap both in
//! place instead of failing on the already-set global default.
//!
//! # Example
//!
//! ```rust,ignore
//! use keystone_telemetry::{init_log, LogConfig};
//!
//! let logger = init_log(&LogConfig::from_raw("json", "debug", "stdout"))?;
//! tracing::debug!(source = "defaults", "configuration loaded");
//! ```

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use parking_lot::const_mutex;
use tracing::{Dispatch, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{reload, Layer, Registry};

use crate::config::{LogConfig, LogFormat, LogOutput};
use crate::error::TelemetryError;
use crate::TelemetryResult;

type FilterLayer = reload::Layer<LevelFilter, Registry>;
type FilteredRegistry = Layered<FilterLayer, Registry>;
type FormatLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Reload handles of the installed process-wide logger.
struct Installed {
    filter: reload::Handle<LevelFilter, Registry>,
    format: reload::Handle<FormatLayer, FilteredRegistry>,
    dispatch: Dispatch,
}

static INSTALLED: parking_lot::Mutex<Option<Installed>> = const_mutex(None);

/// A configured log sink.
#[derive(Debug, Clone)]
pub struct Logger {
    config: LogConfig,
    dispatch: Dispatch,
}

impl Logger {
    /// Builds a logger writing to the output named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::OpenOutput`] if the output file cannot be
    /// opened for appending.
    pub fn new(config: &LogConfig) -> TelemetryResult<Self> {
        let writer = open_output(&config.target())?;
        Ok(Self::with_writer(config, writer))
    }

    /// Builds a logger writing to `writer`, ignoring `config.output`.
    pub fn with_writer<W>(config: &LogConfig, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::registry()
            .with(config.level.as_filter())
            .with(format_layer(config.format, BoxMakeWriter::new(writer)));

        Self {
            config: config.clone(),
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Configuration this logger was built from.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Runs `f` with this logger as the default for the current thread.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

/// Builds a logger from `config` and installs it as the process-wide default.
///
/// Calling this again replaces the level filter, formatter and output of the
/// installed logger; every later record goes to the newest configuration.
///
/// # Errors
///
/// Returns [`TelemetryError::OpenOutput`] if the output file cannot be opened,
/// and [`TelemetryError::LoggingInit`] if another global subscriber was set
/// outside this function.
pub fn init_log(config: &LogConfig) -> TelemetryResult<Logger> {
    let writer = open_output(&config.target())?;
    let filter = config.level.as_filter();
    let format = format_layer::<FilteredRegistry>(config.format, writer);

    let mut installed = INSTALLED.lock();
    if let Some(current) = installed.as_ref() {
        current
            .filter
            .reload(filter)
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        current
            .format
            .reload(format)
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

        return Ok(Logger {
            config: config.clone(),
            dispatch: current.dispatch.clone(),
        });
    }

    let (filter, filter_handle) = reload::Layer::new(filter);
    let (format, format_handle) = reload::Layer::new(format);
    let dispatch = Dispatch::new(tracing_subscriber::registry().with(filter).with(format));

    tracing::dispatcher::set_global_default(dispatch.clone())
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    *installed = Some(Installed {
        filter: filter_handle,
        format: format_handle,
        dispatch: dispatch.clone(),
    });

    Ok(Logger {
        config: config.clone(),
        dispatch,
    })
}

/// Opens the writer for an output target.
fn open_output(output: &LogOutput) -> TelemetryResult<BoxMakeWriter> {
    match output {
        LogOutput::Stdout => Ok(BoxMakeWriter::new(io::stdout)),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::open_output(path, source))?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
    }
}

fn format_layer<S>(format: LogFormat, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .boxed(),
    }
}
