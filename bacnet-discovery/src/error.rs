//! Error types for endpoint management and device scanning.

use std::fmt;

use bacnet_api::ApiError;

use crate::settings::SettingsError;

/// Error type for discovery operations.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The protocol engine failed (endpoint creation, broadcast, ...)
    Engine(ApiError),
    /// A settings string could not be parsed or carried an invalid value
    Settings(SettingsError),
    /// Malformed device address
    InvalidAddress(String),
    /// The scan was interrupted
    Interrupted,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::Engine(err) => write!(f, "Engine error: {}", err),
            DiscoveryError::Settings(err) => write!(f, "Settings error: {}", err),
            DiscoveryError::InvalidAddress(msg) => write!(f, "Invalid device address: {}", msg),
            DiscoveryError::Interrupted => write!(f, "Device scan interrupted"),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiscoveryError::Engine(err) => Some(err),
            DiscoveryError::Settings(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for DiscoveryError {
    fn from(err: ApiError) -> Self {
        DiscoveryError::Engine(err)
    }
}

impl From<SettingsError> for DiscoveryError {
    fn from(err: SettingsError) -> Self {
        DiscoveryError::Settings(err)
    }
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
