//! Protocol values
//!
//! `BacnetValue` is the typed primitive the engine reads and writes.
//! `PrimitiveType` names the declared type of a property so a caller can
//! convert a loosely-typed value before it reaches the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::ObjectIdentifier;
use crate::units::EngineeringUnits;

/// Present value of a binary object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryPv {
    #[default]
    Inactive,
    Active,
}

impl BinaryPv {
    pub fn as_bool(self) -> bool {
        matches!(self, BinaryPv::Active)
    }

    /// Wire code (0 inactive, 1 active).
    pub fn code(self) -> u32 {
        match self {
            BinaryPv::Inactive => 0,
            BinaryPv::Active => 1,
        }
    }
}

impl From<bool> for BinaryPv {
    fn from(value: bool) -> Self {
        if value {
            BinaryPv::Active
        } else {
            BinaryPv::Inactive
        }
    }
}

impl fmt::Display for BinaryPv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryPv::Inactive => f.write_str("inactive"),
            BinaryPv::Active => f.write_str("active"),
        }
    }
}

/// Declared primitive type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Null,
    Boolean,
    UnsignedInteger,
    SignedInteger,
    Real,
    Double,
    CharacterString,
    Enumerated,
    BinaryPv,
    EngineeringUnits,
    ObjectIdentifier,
    BitString,
    Array,
}

/// A typed protocol value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum BacnetValue {
    /// Absent value; written at a priority it relinquishes that slot
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    CharacterString(String),
    Enumerated(u32),
    BinaryPv(BinaryPv),
    EngineeringUnits(EngineeringUnits),
    ObjectIdentifier(ObjectIdentifier),
    BitString(Vec<bool>),
    Array(Vec<BacnetValue>),
}

impl BacnetValue {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            BacnetValue::Null => PrimitiveType::Null,
            BacnetValue::Boolean(_) => PrimitiveType::Boolean,
            BacnetValue::Unsigned(_) => PrimitiveType::UnsignedInteger,
            BacnetValue::Signed(_) => PrimitiveType::SignedInteger,
            BacnetValue::Real(_) => PrimitiveType::Real,
            BacnetValue::Double(_) => PrimitiveType::Double,
            BacnetValue::CharacterString(_) => PrimitiveType::CharacterString,
            BacnetValue::Enumerated(_) => PrimitiveType::Enumerated,
            BacnetValue::BinaryPv(_) => PrimitiveType::BinaryPv,
            BacnetValue::EngineeringUnits(_) => PrimitiveType::EngineeringUnits,
            BacnetValue::ObjectIdentifier(_) => PrimitiveType::ObjectIdentifier,
            BacnetValue::BitString(_) => PrimitiveType::BitString,
            BacnetValue::Array(_) => PrimitiveType::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BacnetValue::Null)
    }

    /// Object identifiers contained in an object-list style array.
    pub fn object_identifiers(&self) -> Vec<ObjectIdentifier> {
        match self {
            BacnetValue::ObjectIdentifier(id) => vec![*id],
            BacnetValue::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    BacnetValue::ObjectIdentifier(id) => Some(*id),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for BacnetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacnetValue::Null => f.write_str("Null"),
            BacnetValue::Boolean(v) => write!(f, "{}", v),
            BacnetValue::Unsigned(v) => write!(f, "{}", v),
            BacnetValue::Signed(v) => write!(f, "{}", v),
            BacnetValue::Real(v) => write!(f, "{}", v),
            BacnetValue::Double(v) => write!(f, "{}", v),
            BacnetValue::CharacterString(v) => f.write_str(v),
            BacnetValue::Enumerated(v) => write!(f, "{}", v),
            BacnetValue::BinaryPv(v) => write!(f, "{}", v),
            BacnetValue::EngineeringUnits(v) => write!(f, "{}", v),
            BacnetValue::ObjectIdentifier(v) => write!(f, "{}", v),
            BacnetValue::BitString(bits) => {
                let rendered: String = bits.iter().map(|b| if *b { 'T' } else { 'F' }).collect();
                write!(f, "[{}]", rendered)
            }
            BacnetValue::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}
