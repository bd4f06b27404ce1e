//! Channel address and unit spec parsing
//!
//! A channel address is `object[#property]`. The object part is either an
//! object name or a numeric designator `type:instance`; the property must
//! be a protocol property name and defaults to `presentValue`.
//!
//! Server channels additionally carry a unit spec `objectType;engineeringUnit`
//! naming the kind of local object to create.

use std::fmt;
use std::str::FromStr;

use bacnet_api::{EngineeringUnits, ObjectIdentifier, ObjectType, PropertyIdentifier};
use thiserror::Error;

/// Separates the object designator from the property name.
pub const PROPERTY_SEPARATOR: char = '#';

/// Separates object type from engineering unit in a unit spec.
pub const UNIT_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Channel address '{0}' has no object designator")]
    EmptyObject(String),

    #[error("Channel address '{0}' contains more than one '#'")]
    TooManySeparators(String),

    #[error("Unknown property '{property}' in channel address '{address}'")]
    UnknownProperty { address: String, property: String },

    #[error("Invalid unit spec '{0}', expected 'objectType;engineeringUnit'")]
    InvalidUnitSpec(String),

    #[error("Unknown {kind} '{name}' in unit spec")]
    UnknownUnitName { kind: &'static str, name: String },
}

/// How a channel names its object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectReference {
    Name(String),
    Id(ObjectIdentifier),
}

impl ObjectReference {
    /// A designator that parses as `type:instance` is an id, anything else a name.
    pub fn parse(designator: &str) -> Self {
        match designator.parse::<ObjectIdentifier>() {
            Ok(id) => ObjectReference::Id(id),
            Err(_) => ObjectReference::Name(designator.to_string()),
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectReference::Name(name) => f.write_str(name),
            ObjectReference::Id(id) => write!(f, "{}", id),
        }
    }
}

/// A parsed `object[#property]` channel address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelAddress {
    pub object: ObjectReference,
    pub property: PropertyIdentifier,
}

impl ChannelAddress {
    pub fn new(object: ObjectReference, property: PropertyIdentifier) -> Self {
        Self { object, property }
    }

    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let mut parts = address.split(PROPERTY_SEPARATOR);
        let designator = parts.next().unwrap_or_default().trim();
        let property = parts.next().map(str::trim);

        if parts.next().is_some() {
            return Err(AddressError::TooManySeparators(address.to_string()));
        }
        if designator.is_empty() {
            return Err(AddressError::EmptyObject(address.to_string()));
        }

        let property = match property {
            None => PropertyIdentifier::PRESENT_VALUE,
            Some(name) => PropertyIdentifier::from_name(name).ok_or_else(|| AddressError::UnknownProperty {
                address: address.to_string(),
                property: name.to_string(),
            })?,
        };

        Ok(Self {
            object: ObjectReference::parse(designator),
            property,
        })
    }

    pub fn is_present_value(&self) -> bool {
        self.property == PropertyIdentifier::PRESENT_VALUE
    }
}

impl FromStr for ChannelAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders `object` alone for the present value, `object#property` otherwise.
impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present_value() {
            write!(f, "{}", self.object)
        } else {
            write!(f, "{}{}{}", self.object, PROPERTY_SEPARATOR, self.property)
        }
    }
}

/// The `objectType;engineeringUnit` pair of a server channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSpec {
    pub object_type: ObjectType,
    pub units: EngineeringUnits,
}

impl UnitSpec {
    pub fn parse(spec: &str) -> Result<Self, AddressError> {
        let (object_type, units) = spec
            .split_once(UNIT_SEPARATOR)
            .ok_or_else(|| AddressError::InvalidUnitSpec(spec.to_string()))?;
        let (object_type, units) = (object_type.trim(), units.trim());

        let object_type = ObjectType::from_name(object_type).ok_or_else(|| AddressError::UnknownUnitName {
            kind: "object type",
            name: object_type.to_string(),
        })?;
        let units = EngineeringUnits::from_name(units).ok_or_else(|| AddressError::UnknownUnitName {
            kind: "engineering unit",
            name: units.to_string(),
        })?;

        Ok(Self { object_type, units })
    }
}
