//! Framework-side channel model
//!
//! The host framework speaks in channels: an address string, a generic
//! typed value and a quality flag. These are the containers it hands to a
//! session and gets back filled in.

use std::fmt;

use bacnet_api::ObjectIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic value kinds understood by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Boolean,
    Integer,
    Float,
    Double,
    String,
}

/// A generic typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(i32),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
        }
    }
}

/// Quality flag attached to every record and write result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    Valid,
    DriverErrorChannelNotAccessible,
    DriverErrorChannelWithThisAddressNotFound,
    /// Fixed flag for channels whose configuration is invalid
    DriverErrorChannelAddressSyntaxInvalid,
    DriverErrorChannelValueTypeConversionException,
    DriverErrorReadFailure,
    DriverErrorTimeout,
    AccessMethodNotSupported,
    UnknownError,
}

/// A value sample with its quality flag and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub value: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub flag: Flag,
}

impl Record {
    pub fn new(value: Value, timestamp: DateTime<Utc>) -> Self {
        Self { value: Some(value), timestamp, flag: Flag::Valid }
    }

    pub fn flagged(flag: Flag, timestamp: DateTime<Utc>) -> Self {
        Self { value: None, timestamp, flag }
    }

    pub fn is_valid(&self) -> bool {
        self.flag == Flag::Valid
    }
}

/// One channel in a read or listen request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecordContainer {
    pub channel_id: String,
    pub channel_address: String,
    /// Filled in by the session
    pub record: Option<Record>,
    /// Resolved object, cached across calls
    pub handle: Option<ObjectIdentifier>,
}

impl ChannelRecordContainer {
    pub fn new(channel_id: impl Into<String>, channel_address: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_address: channel_address.into(),
            record: None,
            handle: None,
        }
    }

    pub fn flag(&self) -> Option<Flag> {
        self.record.as_ref().map(|record| record.flag)
    }

    pub(crate) fn set_flag(&mut self, flag: Flag, timestamp: DateTime<Utc>) {
        self.record = Some(Record::flagged(flag, timestamp));
    }
}

/// One channel in a write request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelValueContainer {
    pub channel_address: String,
    /// `None` releases the command at the session's write priority
    pub value: Option<Value>,
    /// Result of the write, filled in by the session
    pub flag: Option<Flag>,
    pub handle: Option<ObjectIdentifier>,
}

impl ChannelValueContainer {
    pub fn new(channel_address: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            channel_address: channel_address.into(),
            value,
            flag: None,
            handle: None,
        }
    }
}

/// Channel descriptor produced by a channel scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelScanInfo {
    pub channel_address: String,
    pub description: String,
    pub value_type: ValueType,
    pub value_type_length: Option<usize>,
    pub readable: bool,
    pub writable: bool,
    /// `value=<presentValue>;u=<units>`
    pub metadata: String,
}

/// Records pushed to a listener; every notification is a batch of one.
pub type RecordBatch = Vec<ChannelRecordContainer>;
