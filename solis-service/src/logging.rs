//! Logging setup for hosts that do not bring their own subscriber.
//!
//! Hosting frameworks usually install a `tracing` subscriber themselves; the
//! engine only emits events. For standalone use this module offers a small
//! set of ready-made modes.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different environments.
#[derive(Debug, Clone, Copy)]
pub enum LoggingMode {
    /// No output; the host owns logging or none is wanted
    Silent,
    /// Compact stderr output for development
    Development,
    /// Verbose output with source locations
    Debug,
}

/// Logging configuration error.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode.
///
/// Call once, early, before the first cycle runs. The filter honors
/// `SOLIS_LOG_LEVEL`, then `RUST_LOG`, then the mode's default level.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(fmt::layer().with_target(false).compact())
                .with(env_filter("info"));
            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(fmt::layer().pretty().with_file(true).with_line_number(true))
                .with(env_filter("debug"));
            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from the `SOLIS_LOG_MODE` environment variable
/// (`silent`, `development` or `debug`; anything else means silent).
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var("SOLIS_LOG_MODE").as_deref() {
        Ok("development") => LoggingMode::Development,
        Ok("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    };
    init_logging(mode)
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("SOLIS_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
