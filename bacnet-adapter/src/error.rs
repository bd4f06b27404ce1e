//! Error types for the adapter layer.

use bacnet_discovery::{DiscoveryError, SettingsError};
use thiserror::Error;

/// Errors surfaced to the host framework
///
/// Per-channel failures never show up here; they are reported as flags on
/// the individual containers. These variants describe failures of a whole
/// call.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Malformed device address, settings or server configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote device or the local endpoint cannot be used
    #[error("Connection error: {0}")]
    Connection(String),

    /// A channel scan failed while the device was still reachable
    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Operation not supported: {0}")]
    UnsupportedOperation(&'static str),

    #[error("Device scan interrupted")]
    Interrupted,

    /// The session has already been disconnected
    #[error("Connection closed")]
    Disconnected,

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to spawn worker thread: {0}")]
    Worker(#[source] std::io::Error),

    #[error("Invalid server configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DiscoveryError> for AdapterError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::Interrupted => AdapterError::Interrupted,
            DiscoveryError::Settings(err) => AdapterError::Settings(err),
            DiscoveryError::InvalidAddress(msg) => AdapterError::Configuration(msg),
            DiscoveryError::Engine(err) => AdapterError::Connection(err.to_string()),
        }
    }
}

impl AdapterError {
    /// True for the configuration category (bad input, not a bad network).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AdapterError::Configuration(_) | AdapterError::Settings(_) | AdapterError::Json(_)
        )
    }
}

/// Convenience Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use bacnet_api::ApiError;

    use super::*;

    #[test]
    fn test_configuration_category() {
        let settings = bacnet_discovery::Settings::parse("novalue").unwrap_err();
        assert!(AdapterError::from(settings).is_configuration());
        assert!(AdapterError::Configuration("x".into()).is_configuration());
        assert!(!AdapterError::Connection("x".into()).is_configuration());
        assert!(!AdapterError::Interrupted.is_configuration());
    }

    #[test]
    fn test_discovery_error_mapping() {
        assert!(matches!(AdapterError::from(DiscoveryError::Interrupted), AdapterError::Interrupted));
        assert!(AdapterError::from(DiscoveryError::InvalidAddress("x".into())).is_configuration());
        assert!(matches!(
            AdapterError::from(DiscoveryError::Engine(ApiError::Terminated)),
            AdapterError::Connection(_)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = AdapterError::UnsupportedOperation("scanForChannels");
        assert_eq!(err.to_string(), "Operation not supported: scanForChannels");
    }
}
