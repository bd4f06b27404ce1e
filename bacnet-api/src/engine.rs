//! Abstract surface of the external protocol engine
//!
//! The adapter never encodes a frame itself. Everything that touches the
//! wire goes through [`ProtocolEngine`], one instance per local UDP endpoint,
//! created by an [`EngineFactory`]. Asynchronous traffic (change-of-value
//! notifications, changes to locally hosted objects) is pushed by the engine
//! from its own thread into every channel registered with
//! [`ProtocolEngine::register_listener`].

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{PropertyError, Result};
use crate::object::{ObjectIdentifier, ObjectType};
use crate::property::PropertyIdentifier;
use crate::units::EngineeringUnits;
use crate::value::BacnetValue;

/// Parameters for creating one local endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub port: u16,
    pub instance_id: u32,
    pub broadcast_address: Ipv4Addr,
    pub bind_address: Ipv4Addr,
}

/// Identity details fetched from a remote device on demand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub vendor_name: Option<String>,
    pub model_name: Option<String>,
    pub max_apdu: Option<u32>,
}

/// A remote device as known to one local endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDevice {
    pub instance: u32,
    pub address: SocketAddr,
    /// Populated by [`ProtocolEngine::fetch_extended_info`]
    pub info: Option<DeviceInfo>,
}

impl RemoteDevice {
    pub fn new(instance: u32, address: SocketAddr) -> Self {
        Self { instance, address, info: None }
    }

    pub fn name(&self) -> Option<&str> {
        self.info.as_ref().and_then(|info| info.name.as_deref())
    }

    pub fn object_identifier(&self) -> ObjectIdentifier {
        ObjectIdentifier::device(self.instance)
    }
}

/// One (object, property) pair in a batched read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyReference {
    pub object: ObjectIdentifier,
    pub property: PropertyIdentifier,
}

impl PropertyReference {
    pub fn new(object: ObjectIdentifier, property: PropertyIdentifier) -> Self {
        Self { object, property }
    }
}

/// Outcome of one entry in a batched read.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyResult {
    pub reference: PropertyReference,
    pub value: std::result::Result<BacnetValue, PropertyError>,
}

/// Property/value pair carried by a change-of-value notification.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: PropertyIdentifier,
    pub value: BacnetValue,
}

/// Asynchronous event pushed by an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Change-of-value notification from a remote device
    CovNotification {
        initiating_device: u32,
        process_id: u32,
        object: ObjectIdentifier,
        values: Vec<PropertyValue>,
    },
    /// A property of a locally hosted object changed
    LocalPropertyChanged {
        object: ObjectIdentifier,
        property: PropertyIdentifier,
        value: BacnetValue,
    },
}

/// Handle returned by [`ProtocolEngine::register_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Definition of an object hosted by the local endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalObject {
    pub id: ObjectIdentifier,
    pub name: String,
    pub description: Option<String>,
    pub units: Option<EngineeringUnits>,
    pub present_value: BacnetValue,
    pub cov_increment: Option<f32>,
    /// `Some` makes the present value commandable with this relinquish default
    pub relinquish_default: Option<BacnetValue>,
}

impl LocalObject {
    pub fn new(id: ObjectIdentifier, name: impl Into<String>, present_value: BacnetValue) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            units: None,
            present_value,
            cov_increment: None,
            relinquish_default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_units(mut self, units: EngineeringUnits) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_cov_increment(mut self, increment: f32) -> Self {
        self.cov_increment = Some(increment);
        self
    }

    pub fn commandable(mut self, relinquish_default: BacnetValue) -> Self {
        self.relinquish_default = Some(relinquish_default);
        self
    }
}

/// One local endpoint of the protocol engine.
///
/// All calls block until the engine has a response or gives up; timeouts and
/// retries are the engine's business. Implementations must be usable from
/// several threads at once.
pub trait ProtocolEngine: Send + Sync {
    /// Device instance this endpoint announces itself as.
    fn instance_id(&self) -> u32;

    /// UDP port this endpoint is bound to.
    fn port(&self) -> u16;

    /// Broadcasts a Who-Is request. Responses accumulate in
    /// [`discovered_devices`](Self::discovered_devices).
    fn broadcast_discovery(&self) -> Result<()>;

    /// Broadcasts an I-Am for the local device.
    fn broadcast_i_am(&self) -> Result<()>;

    /// Broadcasts a time-synchronization request carrying `time`.
    fn broadcast_time_synchronization(&self, time: SystemTime) -> Result<()>;

    /// Devices that have answered a discovery broadcast so far.
    fn discovered_devices(&self) -> Vec<RemoteDevice>;

    /// Contacts a device directly at a known address, without broadcasting.
    fn locate_device(&self, address: SocketAddr, instance: u32) -> Result<RemoteDevice>;

    /// Reads name and vendor details of a device.
    fn fetch_extended_info(&self, device: &RemoteDevice) -> Result<DeviceInfo>;

    fn read_property(
        &self,
        device: &RemoteDevice,
        object: ObjectIdentifier,
        property: PropertyIdentifier,
    ) -> Result<BacnetValue>;

    /// Reads many properties in as few round trips as the device allows.
    ///
    /// Returns one result per reference, in request order. An `Err` for the
    /// whole call means the batch as a unit failed.
    fn read_properties(
        &self,
        device: &RemoteDevice,
        references: &[PropertyReference],
    ) -> Result<Vec<PropertyResult>>;

    /// Writes a property. `priority` selects a slot of the priority array;
    /// `None` uses the device default. Writing [`BacnetValue::Null`] at a
    /// priority relinquishes that slot.
    fn write_property(
        &self,
        device: &RemoteDevice,
        object: ObjectIdentifier,
        property: PropertyIdentifier,
        value: BacnetValue,
        priority: Option<u8>,
    ) -> Result<()>;

    /// Subscribes to change-of-value notifications. A `lifetime` of 0 means
    /// indefinite.
    fn subscribe_cov(
        &self,
        device: &RemoteDevice,
        process_id: u32,
        object: ObjectIdentifier,
        confirmed: bool,
        lifetime: u32,
    ) -> Result<()>;

    /// Cancels a change-of-value subscription.
    fn cancel_cov(&self, device: &RemoteDevice, process_id: u32, object: ObjectIdentifier) -> Result<()>;

    /// Registers a channel receiving every [`EngineEvent`] of this endpoint.
    fn register_listener(&self, sink: mpsc::Sender<EngineEvent>) -> ListenerId;

    /// Drops a registered channel. Unknown ids are ignored.
    fn unregister_listener(&self, id: ListenerId);

    /// Next free instance number for a local object of `object_type`.
    fn next_instance(&self, object_type: ObjectType) -> u32;

    fn add_object(&self, object: LocalObject) -> Result<()>;

    fn remove_object(&self, id: ObjectIdentifier) -> Result<()>;

    /// Finds a local object by name.
    fn local_object(&self, name: &str) -> Option<ObjectIdentifier>;

    fn read_local(&self, id: ObjectIdentifier, property: PropertyIdentifier) -> Result<BacnetValue>;

    fn write_local(
        &self,
        id: ObjectIdentifier,
        property: PropertyIdentifier,
        value: BacnetValue,
        priority: Option<u8>,
    ) -> Result<()>;

    /// Closes the transport. Later calls fail with `ApiError::Terminated`.
    fn terminate(&self);
}

/// Creates engines for local endpoints.
pub trait EngineFactory: Send + Sync {
    fn create(&self, config: &EndpointConfig) -> Result<Arc<dyn ProtocolEngine>>;
}
