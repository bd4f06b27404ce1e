//! BACnet protocol vocabulary and engine surface
//!
//! This crate holds everything the adapter needs to *name* things on a
//! BACnet/IP network without encoding a single frame:
//!
//! - [`ObjectType`], [`PropertyIdentifier`] and [`EngineeringUnits`], each a
//!   newtype over its protocol code with a static name table
//! - [`BacnetValue`], the typed primitive exchanged with the engine
//! - [`definitions`], the declared type of each property per object type
//! - [`ProtocolEngine`] and [`EngineFactory`], the abstract surface of the
//!   external engine that owns the wire protocol
//!
//! With the `test-support` feature, [`loopback`] provides an in-memory
//! network of simulated devices implementing the engine surface.
//!
//! ```rust
//! use bacnet_api::{ObjectIdentifier, ObjectType, PropertyIdentifier};
//!
//! let property: PropertyIdentifier = "lowLimit".parse().unwrap();
//! assert_eq!(property, PropertyIdentifier::LOW_LIMIT);
//!
//! let object: ObjectIdentifier = "analogValue:3".parse().unwrap();
//! assert_eq!(object.object_type, ObjectType::ANALOG_VALUE);
//! ```

mod macros;

pub mod definitions;
pub mod engine;
pub mod error;
pub mod object;
pub mod property;
pub mod units;
pub mod value;

#[cfg(feature = "test-support")]
pub mod loopback;

pub use definitions::{present_value_type, property_type, PropertyTypeDefinition};
pub use engine::{
    DeviceInfo, EndpointConfig, EngineEvent, EngineFactory, ListenerId, LocalObject, PropertyReference,
    PropertyResult, PropertyValue, ProtocolEngine, RemoteDevice,
};
pub use error::{ApiError, PropertyError, Result};
pub use object::{ObjectIdentifier, ObjectType};
pub use property::PropertyIdentifier;
pub use units::EngineeringUnits;
pub use value::{BacnetValue, BinaryPv, PrimitiveType};
