//! Logging setup for hosts embedding the adapter
//!
//! The adapter itself only emits `tracing` events. A host that does not
//! install its own subscriber can call one of the functions here.

use std::str::FromStr;

use tracing_subscriber::{fmt, EnvFilter, Registry};

const LOG_LEVEL_VAR: &str = "BACNET_ADAPTER_LOG_LEVEL";
const LOG_MODE_VAR: &str = "BACNET_ADAPTER_LOG_MODE";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber at all
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
    /// One JSON object per line, for log collectors
    Json,
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LoggingMode::Silent),
            "development" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            "json" => Ok(LoggingMode::Json),
            other => Err(LoggingError::InvalidEnv(format!("{}={}", LOG_MODE_VAR, other))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Initialize logging with the specified mode
///
/// Fails if a global subscriber is already installed.
///
/// # Environment Variables
///
/// - `BACNET_ADAPTER_LOG_LEVEL`: filter directive (e.g. `bacnet_discovery=debug`)
/// - `RUST_LOG`: used when the variable above is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info");

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug");

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_thread_names(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Json => {
            let filter = create_env_filter("info");

            Registry::default()
                .with(fmt::layer().json().with_current_span(false))
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `BACNET_ADAPTER_LOG_MODE`
///
/// Unset means silent; an unrecognized mode is an error.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_VAR) {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Silent,
    };

    init_logging(mode)
}

/// Like [`init_logging`], but a subscriber that is already installed is
/// not an error. Returns whether this call installed one.
pub fn try_init_logging(mode: LoggingMode) -> bool {
    if is_initialized() {
        return false;
    }
    init_logging(mode).is_ok() && mode != LoggingMode::Silent
}

fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_VAR) {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Debug".parse::<LoggingMode>().unwrap(), LoggingMode::Debug);
        assert_eq!(" json ".parse::<LoggingMode>().unwrap(), LoggingMode::Json);
        assert!(matches!("loud".parse::<LoggingMode>(), Err(LoggingError::InvalidEnv(_))));
    }

    #[test]
    fn test_try_init_silent_installs_nothing() {
        assert!(!try_init_logging(LoggingMode::Silent));
    }
}
