//! Logging setup
//!
//! Console output goes through an [`EnvFilter`] (`RUST_LOG`, falling back to
//! the configured level). Error-level events are additionally appended to the
//! configured error log as one JSON object per line, which is the durable
//! record of failed download requests.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber
///
/// Fails if the error log cannot be opened or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let console = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
    };

    let error_file = match &config.error_log {
        Some(path) => Some(error_log_layer(path)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(build_env_filter(&config.level))
        .with(console)
        .with(error_file)
        .try_init()
        .map_err(|err| Error::Other(format!("failed to install tracing subscriber: {err}")))
}

/// JSON layer that only sees ERROR events and appends them to `path`
pub fn error_log_layer<S>(path: &Path) -> Result<impl Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = open_append(path)?;
    Ok(fmt::layer()
        .json()
        .with_ansi(false)
        .with_current_span(true)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::ERROR))
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Config {
            message: format!("cannot open error log {}: {}", path.display(), e),
            key: Some("error_log".to_string()),
        })
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
