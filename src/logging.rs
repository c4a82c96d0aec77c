//! Logging setup
//!
//! Installs the global `tracing` subscriber. Output goes to stderr or a file
//! so it never mixes with the dashboard drawn on stdout.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unknown log format '{0}', expected 'pretty' or 'json'")]
    Format(String),

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// `RUST_LOG` wins over the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn make_writer(config: &LoggingConfig) -> Result<BoxMakeWriter, LoggingError> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::File {
                    path: path.clone(),
                    source,
                })?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(io::stderr)),
    }
}

/// Install the subscriber described by `config`
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let writer = make_writer(config)?;
    let ansi = config.file.is_none();

    let (pretty, json) = match config.format.as_str() {
        "pretty" => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi),
            ),
            None,
        ),
        "json" => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(writer)),
        ),
        other => return Err(LoggingError::Format(other.to_string())),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(pretty)
        .with(json)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
