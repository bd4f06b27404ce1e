use thiserror::Error;

use crate::object::ObjectIdentifier;
use crate::property::PropertyIdentifier;

/// Errors reported by a protocol engine or by vocabulary lookups
///
/// Engine implementations translate their transport-level failures into
/// these variants so the adapter never sees wire details.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No acknowledgement arrived in time
    #[error("Request to device {device} timed out")]
    Timeout { device: u32 },

    /// The device is not known to this local endpoint
    #[error("Unknown device {0}")]
    UnknownDevice(u32),

    /// The addressed object does not exist
    #[error("Unknown object {0}")]
    UnknownObject(ObjectIdentifier),

    /// The object exists but does not carry this property
    #[error("Unknown property {property} on {object}")]
    UnknownProperty {
        object: ObjectIdentifier,
        property: PropertyIdentifier,
    },

    /// The device refused the write
    #[error("Write access denied to {property} on {object}")]
    WriteAccessDenied {
        object: ObjectIdentifier,
        property: PropertyIdentifier,
    },

    /// The value does not match the declared type of the property
    #[error("Invalid data type: {0}")]
    InvalidDataType(String),

    /// A local object with this identifier or name already exists
    #[error("Duplicate object: {0}")]
    DuplicateObject(String),

    /// The engine could not bind its UDP socket
    #[error("Failed to bind local endpoint on port {port}: {reason}")]
    Bind { port: u16, reason: String },

    /// The engine has been terminated
    #[error("Local endpoint terminated")]
    Terminated,

    /// Transport failure not covered by the variants above
    #[error("Network error: {0}")]
    Network(String),

    /// A name outside the protocol vocabulary
    #[error("Unknown {kind} name '{name}'")]
    UnknownName { kind: &'static str, name: String },

    /// Malformed `type:instance` object identifier
    #[error("Invalid object identifier '{0}'")]
    InvalidIdentifier(String),
}

/// Per-entry failure within a batched property read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("unknown object")]
    UnknownObject,
    #[error("unknown property")]
    UnknownProperty,
    #[error("read access denied")]
    ReadAccessDenied,
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// True when the failure means the device did not answer at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Timeout { .. } | ApiError::UnknownDevice(_) | ApiError::Network(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    #[test]
    fn test_error_display() {
        let err = ApiError::Timeout { device: 42 };
        assert_eq!(format!("{}", err), "Request to device 42 timed out");

        let err = ApiError::UnknownProperty {
            object: ObjectIdentifier::new(ObjectType::ANALOG_VALUE, 1),
            property: PropertyIdentifier::LOW_LIMIT,
        };
        assert_eq!(format!("{}", err), "Unknown property lowLimit on analogValue:1");

        let err = ApiError::UnknownName { kind: "PropertyIdentifier", name: "foo".to_string() };
        assert_eq!(format!("{}", err), "Unknown PropertyIdentifier name 'foo'");
    }

    #[test]
    fn test_unreachable_classification() {
        assert!(ApiError::Timeout { device: 1 }.is_unreachable());
        assert!(ApiError::Network("down".to_string()).is_unreachable());
        assert!(!ApiError::InvalidDataType("x".to_string()).is_unreachable());
    }
}
