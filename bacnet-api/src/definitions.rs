//! Declared property types per object type
//!
//! Lookup table answering "what primitive type does property P of an object
//! of type T carry, and is it commandable". Callers use it to convert loosely
//! typed values before writing, and to decide how to render values they read.

use crate::object::ObjectType;
use crate::property::PropertyIdentifier;
use crate::value::PrimitiveType;

/// Declared type of one property of one object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyTypeDefinition {
    pub object_type: ObjectType,
    pub property: PropertyIdentifier,
    pub primitive: PrimitiveType,
    /// Writes go through the 16-slot priority array
    pub commandable: bool,
}

/// Looks up the declared type of `property` on objects of `object_type`.
///
/// Returns `None` for unassigned object types and for properties the table
/// does not define on that type (for example the present value of a
/// schedule, whose type depends on the schedule's configuration).
pub fn property_type(
    object_type: ObjectType,
    property: PropertyIdentifier,
) -> Option<PropertyTypeDefinition> {
    object_type.name()?;

    let primitive = specific_property_type(object_type, property)
        .or_else(|| common_property_type(property))?;

    Some(PropertyTypeDefinition {
        object_type,
        property,
        primitive,
        commandable: property == PropertyIdentifier::PRESENT_VALUE && is_commandable(object_type),
    })
}

/// Shortcut for the present-value definition.
pub fn present_value_type(object_type: ObjectType) -> Option<PropertyTypeDefinition> {
    property_type(object_type, PropertyIdentifier::PRESENT_VALUE)
}

/// Object types whose present value is commandable.
pub fn is_commandable(object_type: ObjectType) -> bool {
    matches!(
        object_type,
        ObjectType::ANALOG_OUTPUT
            | ObjectType::ANALOG_VALUE
            | ObjectType::BINARY_OUTPUT
            | ObjectType::BINARY_VALUE
            | ObjectType::MULTI_STATE_OUTPUT
            | ObjectType::MULTI_STATE_VALUE
    )
}

/// Auxiliary (non present-value) properties worth exposing per object type.
pub fn auxiliary_properties(object_type: ObjectType) -> &'static [PropertyIdentifier] {
    use PropertyIdentifier as P;

    match object_type {
        ObjectType::ANALOG_INPUT | ObjectType::ANALOG_OUTPUT | ObjectType::ANALOG_VALUE => &[
            P::UNITS,
            P::HIGH_LIMIT,
            P::LOW_LIMIT,
            P::DEADBAND,
            P::COV_INCREMENT,
            P::MIN_PRES_VALUE,
            P::MAX_PRES_VALUE,
            P::OUT_OF_SERVICE,
        ],
        ObjectType::BINARY_INPUT | ObjectType::BINARY_OUTPUT | ObjectType::BINARY_VALUE => &[
            P::ACTIVE_TEXT,
            P::INACTIVE_TEXT,
            P::POLARITY,
            P::CHANGE_OF_STATE_COUNT,
            P::OUT_OF_SERVICE,
        ],
        ObjectType::MULTI_STATE_INPUT
        | ObjectType::MULTI_STATE_OUTPUT
        | ObjectType::MULTI_STATE_VALUE => &[P::NUMBER_OF_STATES, P::STATE_TEXT, P::OUT_OF_SERVICE],
        _ => &[],
    }
}

fn is_input(object_type: ObjectType) -> bool {
    matches!(
        object_type,
        ObjectType::ANALOG_INPUT | ObjectType::BINARY_INPUT | ObjectType::MULTI_STATE_INPUT
    )
}

fn specific_property_type(
    object_type: ObjectType,
    property: PropertyIdentifier,
) -> Option<PrimitiveType> {
    use PrimitiveType as T;
    use PropertyIdentifier as P;

    let commandable_only = |primitive| (!is_input(object_type)).then_some(primitive);

    match object_type {
        ObjectType::ANALOG_INPUT | ObjectType::ANALOG_OUTPUT | ObjectType::ANALOG_VALUE => {
            match property {
                P::PRESENT_VALUE
                | P::COV_INCREMENT
                | P::HIGH_LIMIT
                | P::LOW_LIMIT
                | P::DEADBAND
                | P::MIN_PRES_VALUE
                | P::MAX_PRES_VALUE
                | P::RESOLUTION => Some(T::Real),
                P::RELINQUISH_DEFAULT => commandable_only(T::Real),
                P::PRIORITY_ARRAY => commandable_only(T::Array),
                P::UNITS => Some(T::EngineeringUnits),
                P::NOTIFICATION_CLASS | P::TIME_DELAY => Some(T::UnsignedInteger),
                P::LIMIT_ENABLE | P::EVENT_ENABLE | P::ACKED_TRANSITIONS => Some(T::BitString),
                _ => None,
            }
        }
        ObjectType::BINARY_INPUT | ObjectType::BINARY_OUTPUT | ObjectType::BINARY_VALUE => {
            match property {
                P::PRESENT_VALUE | P::ALARM_VALUE => Some(T::BinaryPv),
                P::RELINQUISH_DEFAULT | P::FEEDBACK_VALUE => commandable_only(T::BinaryPv),
                P::PRIORITY_ARRAY => commandable_only(T::Array),
                P::POLARITY => Some(T::Enumerated),
                P::ACTIVE_TEXT | P::INACTIVE_TEXT => Some(T::CharacterString),
                P::CHANGE_OF_STATE_COUNT
                | P::ELAPSED_ACTIVE_TIME
                | P::MINIMUM_OFF_TIME
                | P::MINIMUM_ON_TIME => Some(T::UnsignedInteger),
                _ => None,
            }
        }
        ObjectType::MULTI_STATE_INPUT
        | ObjectType::MULTI_STATE_OUTPUT
        | ObjectType::MULTI_STATE_VALUE => match property {
            P::PRESENT_VALUE | P::NUMBER_OF_STATES => Some(T::UnsignedInteger),
            P::RELINQUISH_DEFAULT | P::FEEDBACK_VALUE => commandable_only(T::UnsignedInteger),
            P::PRIORITY_ARRAY => commandable_only(T::Array),
            P::STATE_TEXT | P::ALARM_VALUES | P::FAULT_VALUES => Some(T::Array),
            _ => None,
        },
        ObjectType::DEVICE => match property {
            P::OBJECT_LIST | P::PROTOCOL_SERVICES_SUPPORTED | P::PROTOCOL_OBJECT_TYPES_SUPPORTED => {
                Some(T::Array)
            }
            P::VENDOR_NAME
            | P::MODEL_NAME
            | P::FIRMWARE_REVISION
            | P::APPLICATION_SOFTWARE_VERSION
            | P::LOCATION => Some(T::CharacterString),
            P::VENDOR_IDENTIFIER
            | P::PROTOCOL_VERSION
            | P::PROTOCOL_REVISION
            | P::MAX_APDU_LENGTH_ACCEPTED
            | P::APDU_TIMEOUT
            | P::NUMBER_OF_APDU_RETRIES
            | P::DATABASE_REVISION => Some(T::UnsignedInteger),
            P::SYSTEM_STATUS | P::SEGMENTATION_SUPPORTED => Some(T::Enumerated),
            P::UTC_OFFSET => Some(T::SignedInteger),
            _ => None,
        },
        ObjectType::ACCUMULATOR => match property {
            P::PRESENT_VALUE | P::MAX_PRES_VALUE => Some(T::UnsignedInteger),
            P::UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::LOOP => match property {
            P::PRESENT_VALUE
            | P::SETPOINT
            | P::PROPORTIONAL_CONSTANT
            | P::INTEGRAL_CONSTANT
            | P::DERIVATIVE_CONSTANT
            | P::BIAS
            | P::MAXIMUM_OUTPUT
            | P::MINIMUM_OUTPUT => Some(T::Real),
            P::OUTPUT_UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::PULSE_CONVERTER => match property {
            P::PRESENT_VALUE | P::SCALE_FACTOR | P::ADJUST_VALUE | P::COV_INCREMENT => Some(T::Real),
            P::UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::INTEGER_VALUE => match property {
            P::PRESENT_VALUE | P::RELINQUISH_DEFAULT => Some(T::SignedInteger),
            P::UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::POSITIVE_INTEGER_VALUE => match property {
            P::PRESENT_VALUE | P::RELINQUISH_DEFAULT => Some(T::UnsignedInteger),
            P::UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::LARGE_ANALOG_VALUE => match property {
            P::PRESENT_VALUE | P::RELINQUISH_DEFAULT | P::COV_INCREMENT => Some(T::Double),
            P::UNITS => Some(T::EngineeringUnits),
            _ => None,
        },
        ObjectType::CHARACTERSTRING_VALUE => match property {
            P::PRESENT_VALUE | P::RELINQUISH_DEFAULT => Some(T::CharacterString),
            _ => None,
        },
        _ => None,
    }
}

fn common_property_type(property: PropertyIdentifier) -> Option<PrimitiveType> {
    use PrimitiveType as T;
    use PropertyIdentifier as P;

    match property {
        P::OBJECT_IDENTIFIER => Some(T::ObjectIdentifier),
        P::OBJECT_NAME | P::DESCRIPTION | P::PROFILE_NAME => Some(T::CharacterString),
        P::OBJECT_TYPE | P::EVENT_STATE | P::RELIABILITY => Some(T::Enumerated),
        P::STATUS_FLAGS => Some(T::BitString),
        P::OUT_OF_SERVICE => Some(T::Boolean),
        P::PROPERTY_LIST => Some(T::Array),
        _ => None,
    }
}
