//! Conversion between protocol values and generic channel values
//!
//! The mapping is a fixed table keyed by the declared primitive type of the
//! property being read or written:
//!
//! | primitive          | value type |
//! |--------------------|------------|
//! | `Real`             | `Float`    |
//! | `Double`           | `Double`   |
//! | `BinaryPv`         | `Boolean`  |
//! | `Boolean`          | `Boolean`  |
//! | `UnsignedInteger`  | `Integer`  |
//!
//! Reads of any other primitive degrade to the value's string rendering.
//! Writes of any other primitive fail. Round trips through both directions
//! are lossless except for negative integers, which have no unsigned
//! representation.

use bacnet_api::{BacnetValue, BinaryPv, ObjectType, PrimitiveType, PropertyTypeDefinition};
use thiserror::Error;

use crate::channel::{Value, ValueType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The property's type has no generic counterpart for writing
    #[error("No value type mapping for {0:?}")]
    Unsupported(PrimitiveType),

    /// The value cannot be represented as the declared type
    #[error("Cannot convert {value} to {primitive:?}")]
    Incompatible { value: String, primitive: PrimitiveType },
}

/// Generic value type of a primitive, if the table maps it.
pub fn value_type(primitive: PrimitiveType) -> Option<ValueType> {
    match primitive {
        PrimitiveType::Real => Some(ValueType::Float),
        PrimitiveType::Double => Some(ValueType::Double),
        PrimitiveType::BinaryPv | PrimitiveType::Boolean => Some(ValueType::Boolean),
        PrimitiveType::UnsignedInteger => Some(ValueType::Integer),
        _ => None,
    }
}

/// Value type reported for a property in channel scans.
pub fn reported_value_type(definition: &PropertyTypeDefinition) -> ValueType {
    value_type(definition.primitive).unwrap_or(ValueType::String)
}

/// Exposure of an object type in channel scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectTypeMapping {
    pub value_type: ValueType,
    pub writable: bool,
}

/// Object types exposed as channels; everything else is skipped by scans.
pub fn object_type_mapping(object_type: ObjectType) -> Option<ObjectTypeMapping> {
    let (value_type, writable) = match object_type {
        ObjectType::ANALOG_INPUT => (ValueType::Float, false),
        ObjectType::ANALOG_OUTPUT | ObjectType::ANALOG_VALUE => (ValueType::Float, true),
        ObjectType::BINARY_INPUT => (ValueType::Boolean, false),
        ObjectType::BINARY_OUTPUT | ObjectType::BINARY_VALUE => (ValueType::Boolean, true),
        ObjectType::MULTI_STATE_INPUT => (ValueType::Integer, false),
        ObjectType::MULTI_STATE_OUTPUT | ObjectType::MULTI_STATE_VALUE => (ValueType::Integer, true),
        _ => return None,
    };
    Some(ObjectTypeMapping { value_type, writable })
}

/// Converts a value read from the device.
pub fn to_generic(value: &BacnetValue, definition: &PropertyTypeDefinition) -> Result<Value, ConversionError> {
    let incompatible = || ConversionError::Incompatible {
        value: value.to_string(),
        primitive: definition.primitive,
    };

    let converted = match (definition.primitive, value) {
        (PrimitiveType::Real, BacnetValue::Real(v)) => Value::Float(*v),
        (PrimitiveType::Double, BacnetValue::Double(v)) => Value::Double(*v),
        (PrimitiveType::BinaryPv, BacnetValue::BinaryPv(pv)) => Value::Boolean(pv.as_bool()),
        (PrimitiveType::BinaryPv, BacnetValue::Enumerated(code @ 0..=1)) => Value::Boolean(*code == 1),
        (PrimitiveType::Boolean, BacnetValue::Boolean(v)) => Value::Boolean(*v),
        (PrimitiveType::UnsignedInteger, BacnetValue::Unsigned(v)) => {
            Value::Integer(i32::try_from(*v).map_err(|_| incompatible())?)
        }
        (primitive, _) if value_type(primitive).is_some() => return Err(incompatible()),
        (_, other) => Value::String(other.to_string()),
    };
    Ok(converted)
}

/// Converts a value to be written. `None` becomes `Null`, which
/// relinquishes a commanded value.
pub fn to_protocol(value: Option<&Value>, definition: &PropertyTypeDefinition) -> Result<BacnetValue, ConversionError> {
    let Some(value) = value else {
        return Ok(BacnetValue::Null);
    };

    let primitive = definition.primitive;
    let incompatible = || ConversionError::Incompatible {
        value: value.to_string(),
        primitive,
    };

    let converted = match primitive {
        PrimitiveType::Real => BacnetValue::Real(match value {
            Value::Float(v) => *v,
            Value::Double(v) => *v as f32,
            Value::Integer(v) => *v as f32,
            Value::Boolean(v) => f32::from(u8::from(*v)),
            Value::String(s) => s.trim().parse().map_err(|_| incompatible())?,
        }),
        PrimitiveType::Double => BacnetValue::Double(match value {
            Value::Float(v) => f64::from(*v),
            Value::Double(v) => *v,
            Value::Integer(v) => f64::from(*v),
            Value::Boolean(v) => f64::from(u8::from(*v)),
            Value::String(s) => s.trim().parse().map_err(|_| incompatible())?,
        }),
        PrimitiveType::BinaryPv => BacnetValue::BinaryPv(BinaryPv::from(as_bool(value).ok_or_else(incompatible)?)),
        PrimitiveType::Boolean => BacnetValue::Boolean(as_bool(value).ok_or_else(incompatible)?),
        PrimitiveType::UnsignedInteger => BacnetValue::Unsigned(match value {
            Value::Integer(v) => u32::try_from(*v).map_err(|_| incompatible())?,
            Value::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f32 => *v as u32,
            Value::Double(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX) => *v as u32,
            Value::Boolean(v) => u32::from(*v),
            Value::String(s) => s.trim().parse().map_err(|_| incompatible())?,
            _ => return Err(incompatible()),
        }),
        other => return Err(ConversionError::Unsupported(other)),
    };
    Ok(converted)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(v) => Some(*v),
        Value::Integer(0) => Some(false),
        Value::Integer(1) => Some(true),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "active" | "1" => Some(true),
            "false" | "inactive" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacnet_api::{present_value_type, property_type, EngineeringUnits, PropertyIdentifier};
    use proptest::prelude::*;
    use rstest::rstest;

    fn pv(object_type: ObjectType) -> PropertyTypeDefinition {
        present_value_type(object_type).unwrap()
    }

    #[rstest]
    #[case(ObjectType::ANALOG_VALUE, BacnetValue::Real(21.5), Value::Float(21.5))]
    #[case(ObjectType::BINARY_INPUT, BacnetValue::BinaryPv(BinaryPv::Active), Value::Boolean(true))]
    #[case(ObjectType::MULTI_STATE_VALUE, BacnetValue::Unsigned(3), Value::Integer(3))]
    #[case(ObjectType::LARGE_ANALOG_VALUE, BacnetValue::Double(1e12), Value::Double(1e12))]
    fn test_to_generic_mapped(#[case] object_type: ObjectType, #[case] raw: BacnetValue, #[case] expected: Value) {
        assert_eq!(to_generic(&raw, &pv(object_type)).unwrap(), expected);
    }

    #[test]
    fn test_to_generic_unmapped_renders_string() {
        let definition = property_type(ObjectType::ANALOG_INPUT, PropertyIdentifier::UNITS).unwrap();
        let value = BacnetValue::EngineeringUnits(EngineeringUnits::DEGREES_CELSIUS);
        assert_eq!(
            to_generic(&value, &definition).unwrap(),
            Value::String("degreesCelsius".to_string())
        );
    }

    #[test]
    fn test_to_generic_mismatch() {
        let err = to_generic(&BacnetValue::Null, &pv(ObjectType::ANALOG_VALUE)).unwrap_err();
        assert!(matches!(err, ConversionError::Incompatible { primitive: PrimitiveType::Real, .. }));
    }

    #[test]
    fn test_to_protocol_none_is_null() {
        assert_eq!(to_protocol(None, &pv(ObjectType::ANALOG_OUTPUT)).unwrap(), BacnetValue::Null);
    }

    #[rstest]
    #[case(ObjectType::ANALOG_OUTPUT, Value::Integer(20), BacnetValue::Real(20.0))]
    #[case(ObjectType::BINARY_OUTPUT, Value::Boolean(true), BacnetValue::BinaryPv(BinaryPv::Active))]
    #[case(ObjectType::BINARY_VALUE, Value::String("inactive".into()), BacnetValue::BinaryPv(BinaryPv::Inactive))]
    #[case(ObjectType::MULTI_STATE_OUTPUT, Value::Float(2.0), BacnetValue::Unsigned(2))]
    fn test_to_protocol_coercions(#[case] object_type: ObjectType, #[case] value: Value, #[case] expected: BacnetValue) {
        assert_eq!(to_protocol(Some(&value), &pv(object_type)).unwrap(), expected);
    }

    #[test]
    fn test_negative_integer_has_no_unsigned_form() {
        let err = to_protocol(Some(&Value::Integer(-1)), &pv(ObjectType::MULTI_STATE_VALUE)).unwrap_err();
        assert!(matches!(err, ConversionError::Incompatible { .. }));
    }

    #[test]
    fn test_unmapped_write_fails() {
        let definition = property_type(ObjectType::ANALOG_VALUE, PropertyIdentifier::OBJECT_NAME).unwrap();
        assert_eq!(
            to_protocol(Some(&Value::String("x".into())), &definition),
            Err(ConversionError::Unsupported(PrimitiveType::CharacterString))
        );
    }

    #[test]
    fn test_object_type_mapping() {
        assert_eq!(
            object_type_mapping(ObjectType::ANALOG_INPUT),
            Some(ObjectTypeMapping { value_type: ValueType::Float, writable: false })
        );
        assert!(object_type_mapping(ObjectType::MULTI_STATE_VALUE).unwrap().writable);
        assert_eq!(object_type_mapping(ObjectType::SCHEDULE), None);
        assert_eq!(object_type_mapping(ObjectType::DEVICE), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_float_round_trip(v in proptest::num::f32::NORMAL) {
            let definition = pv(ObjectType::ANALOG_VALUE);
            let raw = to_protocol(Some(&Value::Float(v)), &definition).unwrap();
            prop_assert_eq!(to_generic(&raw, &definition).unwrap(), Value::Float(v));
        }

        #[test]
        fn test_boolean_round_trip(v in any::<bool>()) {
            let definition = pv(ObjectType::BINARY_VALUE);
            let raw = to_protocol(Some(&Value::Boolean(v)), &definition).unwrap();
            prop_assert_eq!(to_generic(&raw, &definition).unwrap(), Value::Boolean(v));
        }

        #[test]
        fn test_unsigned_round_trip(v in 0i32..=i32::MAX) {
            let definition = pv(ObjectType::MULTI_STATE_VALUE);
            let raw = to_protocol(Some(&Value::Integer(v)), &definition).unwrap();
            prop_assert_eq!(to_generic(&raw, &definition).unwrap(), Value::Integer(v));
        }
    }
}
