//! Logging initialisation via tracing-subscriber.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level '{level}': {message}")]
    Filter { level: String, message: String },

    #[error("failed to set subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when it is set and valid; otherwise `level` is used.
pub fn init(level: &str, ansi: bool) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| LoggerError::Filter {
            level: level.to_string(),
            message: e.to_string(),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))
}
