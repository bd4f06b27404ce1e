//! In-memory loopback network for tests
//!
//! `LoopbackNetwork` is an [`EngineFactory`] whose engines talk to simulated
//! devices held in process memory. Tests populate the network with
//! [`SimulatedDevice`]s, drive the adapter, then inspect what reached the
//! "wire": broadcasts, writes, active change-of-value subscriptions and
//! endpoint lifecycles. Failure modes (unreachable devices, denied writes,
//! missing extended info, bind failures) are switched on per device or port.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Weak};
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::definitions::property_type;
use crate::engine::{
    DeviceInfo, EndpointConfig, EngineEvent, EngineFactory, ListenerId, LocalObject, PropertyReference,
    PropertyResult, PropertyValue, ProtocolEngine, RemoteDevice,
};
use crate::error::{ApiError, PropertyError, Result};
use crate::object::{ObjectIdentifier, ObjectType};
use crate::property::PropertyIdentifier;
use crate::units::EngineeringUnits;
use crate::value::{BacnetValue, BinaryPv};

/// A write that reached a simulated device.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub device: u32,
    pub object: ObjectIdentifier,
    pub property: PropertyIdentifier,
    pub value: BacnetValue,
    pub priority: Option<u8>,
}

/// An object hosted by a simulated device.
#[derive(Debug, Clone)]
pub struct SimulatedObject {
    id: ObjectIdentifier,
    properties: BTreeMap<PropertyIdentifier, BacnetValue>,
}

impl SimulatedObject {
    pub fn new(id: ObjectIdentifier, name: &str) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(PropertyIdentifier::OBJECT_IDENTIFIER, BacnetValue::ObjectIdentifier(id));
        properties.insert(PropertyIdentifier::OBJECT_NAME, BacnetValue::CharacterString(name.to_string()));
        properties.insert(PropertyIdentifier::OBJECT_TYPE, BacnetValue::Enumerated(id.object_type.code() as u32));
        properties.insert(PropertyIdentifier::STATUS_FLAGS, BacnetValue::BitString(vec![false; 4]));
        properties.insert(PropertyIdentifier::OUT_OF_SERVICE, BacnetValue::Boolean(false));
        Self { id, properties }
    }

    pub fn with(mut self, property: PropertyIdentifier, value: BacnetValue) -> Self {
        self.properties.insert(property, value);
        self
    }

    pub fn analog(object_type: ObjectType, instance: u32, name: &str, value: f32, units: EngineeringUnits) -> Self {
        Self::new(ObjectIdentifier::new(object_type, instance), name)
            .with(PropertyIdentifier::PRESENT_VALUE, BacnetValue::Real(value))
            .with(PropertyIdentifier::UNITS, BacnetValue::EngineeringUnits(units))
            .with(PropertyIdentifier::DESCRIPTION, BacnetValue::CharacterString(format!("{} description", name)))
    }

    pub fn binary(object_type: ObjectType, instance: u32, name: &str, value: bool) -> Self {
        Self::new(ObjectIdentifier::new(object_type, instance), name)
            .with(PropertyIdentifier::PRESENT_VALUE, BacnetValue::BinaryPv(BinaryPv::from(value)))
            .with(PropertyIdentifier::ACTIVE_TEXT, BacnetValue::CharacterString("on".to_string()))
            .with(PropertyIdentifier::INACTIVE_TEXT, BacnetValue::CharacterString("off".to_string()))
    }

    pub fn multi_state(object_type: ObjectType, instance: u32, name: &str, value: u32, states: u32) -> Self {
        Self::new(ObjectIdentifier::new(object_type, instance), name)
            .with(PropertyIdentifier::PRESENT_VALUE, BacnetValue::Unsigned(value))
            .with(PropertyIdentifier::NUMBER_OF_STATES, BacnetValue::Unsigned(states))
    }

    pub fn id(&self) -> ObjectIdentifier {
        self.id
    }
}

/// A remote device on the loopback network.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    instance: u32,
    address: SocketAddr,
    name: String,
    reachable: bool,
    extended_info: bool,
    objects: BTreeMap<ObjectIdentifier, BTreeMap<PropertyIdentifier, BacnetValue>>,
    denied_writes: HashSet<ObjectIdentifier>,
    /// (subscriber port, process id, object)
    subscriptions: BTreeSet<(u16, u32, ObjectIdentifier)>,
}

impl SimulatedDevice {
    /// Device listening on `port` at 127.0.0.1.
    pub fn new(instance: u32, port: u16) -> Self {
        Self {
            instance,
            address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            name: format!("Device {}", instance),
            reachable: true,
            extended_info: true,
            objects: BTreeMap::new(),
            denied_writes: HashSet::new(),
            subscriptions: BTreeSet::new(),
        }
    }

    pub fn at(mut self, ip: IpAddr) -> Self {
        self.address = SocketAddr::new(ip, self.address.port());
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Answers Who-Is but fails every extended-info request.
    pub fn without_extended_info(mut self) -> Self {
        self.extended_info = false;
        self
    }

    pub fn with_object(mut self, object: SimulatedObject) -> Self {
        self.objects.insert(object.id, object.properties);
        self
    }

    pub fn deny_writes(mut self, object: ObjectIdentifier) -> Self {
        self.denied_writes.insert(object);
        self
    }

    fn device_property(&self, property: PropertyIdentifier) -> Option<BacnetValue> {
        match property {
            PropertyIdentifier::OBJECT_NAME => Some(BacnetValue::CharacterString(self.name.clone())),
            PropertyIdentifier::OBJECT_IDENTIFIER => {
                Some(BacnetValue::ObjectIdentifier(ObjectIdentifier::device(self.instance)))
            }
            PropertyIdentifier::OBJECT_LIST => {
                let mut list = vec![BacnetValue::ObjectIdentifier(ObjectIdentifier::device(self.instance))];
                list.extend(self.objects.keys().map(|id| BacnetValue::ObjectIdentifier(*id)));
                Some(BacnetValue::Array(list))
            }
            PropertyIdentifier::VENDOR_NAME => Some(BacnetValue::CharacterString("Loopback".to_string())),
            PropertyIdentifier::MODEL_NAME => Some(BacnetValue::CharacterString("Simulated device".to_string())),
            PropertyIdentifier::MAX_APDU_LENGTH_ACCEPTED => Some(BacnetValue::Unsigned(1476)),
            _ => None,
        }
    }

    fn read(&self, object: ObjectIdentifier, property: PropertyIdentifier) -> std::result::Result<BacnetValue, PropertyError> {
        if object == ObjectIdentifier::device(self.instance) {
            return self.device_property(property).ok_or(PropertyError::UnknownProperty);
        }
        let properties = self.objects.get(&object).ok_or(PropertyError::UnknownObject)?;
        properties.get(&property).cloned().ok_or(PropertyError::UnknownProperty)
    }

    fn remote(&self) -> RemoteDevice {
        RemoteDevice::new(self.instance, self.address)
    }
}

#[derive(Default)]
struct NetworkState {
    devices: BTreeMap<u32, SimulatedDevice>,
    engines: Vec<Weak<LoopbackEngine>>,
    failing_ports: HashSet<u16>,
    created: Vec<EndpointConfig>,
    terminated: Vec<u16>,
    discovery_broadcasts: HashMap<u16, usize>,
    i_am_broadcasts: usize,
    time_synchronizations: usize,
    writes: Vec<WriteRecord>,
    subscribe_calls: usize,
    cancel_calls: usize,
    batch_reads: usize,
}

/// Shared in-memory network; cloning yields another handle to the same network.
#[derive(Clone, Default)]
pub struct LoopbackNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl LoopbackNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&self, device: SimulatedDevice) {
        self.state.lock().devices.insert(device.instance, device);
    }

    pub fn set_reachable(&self, instance: u32, reachable: bool) {
        if let Some(device) = self.state.lock().devices.get_mut(&instance) {
            device.reachable = reachable;
        }
    }

    /// Makes endpoint creation on `port` fail with a bind error.
    pub fn fail_endpoint_creation(&self, port: u16) {
        self.state.lock().failing_ports.insert(port);
    }

    /// Sets a property value directly, bypassing write checks.
    pub fn set_property(&self, instance: u32, object: ObjectIdentifier, property: PropertyIdentifier, value: BacnetValue) {
        let mut state = self.state.lock();
        if let Some(properties) = state.devices.get_mut(&instance).and_then(|d| d.objects.get_mut(&object)) {
            properties.insert(property, value);
        }
    }

    pub fn property(&self, instance: u32, object: ObjectIdentifier, property: PropertyIdentifier) -> Option<BacnetValue> {
        let state = self.state.lock();
        state.devices.get(&instance)?.read(object, property).ok()
    }

    /// Changes a present value and notifies every endpoint subscribed to it.
    ///
    /// Returns the number of notifications delivered.
    pub fn notify(&self, instance: u32, object: ObjectIdentifier, value: BacnetValue) -> usize {
        let mut state = self.state.lock();
        let Some(device) = state.devices.get_mut(&instance) else {
            return 0;
        };
        if let Some(properties) = device.objects.get_mut(&object) {
            properties.insert(PropertyIdentifier::PRESENT_VALUE, value.clone());
        }

        let targets: Vec<(u16, u32)> = device
            .subscriptions
            .iter()
            .filter(|(_, _, subscribed)| *subscribed == object)
            .map(|(port, process_id, _)| (*port, *process_id))
            .collect();

        let mut delivered = 0;
        for (port, process_id) in targets {
            let event = cov_event(instance, process_id, object, value.clone());
            delivered += deliver(&mut state, port, &event);
        }
        delivered
    }

    /// Delivers a notification to every endpoint on `port`, subscribed or not.
    pub fn inject(&self, port: u16, instance: u32, object: ObjectIdentifier, value: BacnetValue) -> usize {
        let mut state = self.state.lock();
        deliver(&mut state, port, &cov_event(instance, 0, object, value))
    }

    /// Objects of `instance` with at least one active subscription.
    pub fn active_subscriptions(&self, instance: u32) -> Vec<ObjectIdentifier> {
        let state = self.state.lock();
        let Some(device) = state.devices.get(&instance) else {
            return Vec::new();
        };
        let objects: BTreeSet<_> = device.subscriptions.iter().map(|(_, _, object)| *object).collect();
        objects.into_iter().collect()
    }

    pub fn created_endpoints(&self) -> Vec<EndpointConfig> {
        self.state.lock().created.clone()
    }

    pub fn terminated_endpoints(&self) -> Vec<u16> {
        self.state.lock().terminated.clone()
    }

    pub fn discovery_broadcasts(&self, port: u16) -> usize {
        self.state.lock().discovery_broadcasts.get(&port).copied().unwrap_or(0)
    }

    pub fn i_am_broadcasts(&self) -> usize {
        self.state.lock().i_am_broadcasts
    }

    pub fn time_synchronizations(&self) -> usize {
        self.state.lock().time_synchronizations
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.state.lock().writes.clone()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.lock().subscribe_calls
    }

    pub fn cancel_calls(&self) -> usize {
        self.state.lock().cancel_calls
    }

    pub fn batch_reads(&self) -> usize {
        self.state.lock().batch_reads
    }

    /// Runs `f` against a reachable device.
    fn with_device<T>(
        &self,
        instance: u32,
        f: impl FnOnce(&mut NetworkState, u32) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock();
        let reachable = state.devices.get(&instance).map(|device| device.reachable);
        match reachable {
            Some(true) => f(&mut state, instance),
            Some(false) => Err(ApiError::Timeout { device: instance }),
            None => Err(ApiError::UnknownDevice(instance)),
        }
    }
}

fn cov_event(instance: u32, process_id: u32, object: ObjectIdentifier, value: BacnetValue) -> EngineEvent {
    EngineEvent::CovNotification {
        initiating_device: instance,
        process_id,
        object,
        values: vec![
            PropertyValue { property: PropertyIdentifier::PRESENT_VALUE, value },
            PropertyValue {
                property: PropertyIdentifier::STATUS_FLAGS,
                value: BacnetValue::BitString(vec![false; 4]),
            },
        ],
    }
}

fn deliver(state: &mut NetworkState, port: u16, event: &EngineEvent) -> usize {
    state.engines.retain(|engine| engine.strong_count() > 0);
    state
        .engines
        .iter()
        .filter_map(Weak::upgrade)
        .filter(|engine| engine.config.port == port)
        .map(|engine| engine.emit(event))
        .sum()
}

impl EngineFactory for LoopbackNetwork {
    fn create(&self, config: &EndpointConfig) -> Result<Arc<dyn ProtocolEngine>> {
        let mut state = self.state.lock();
        if state.failing_ports.contains(&config.port) {
            tracing::debug!("Refusing loopback endpoint on port {}", config.port);
            return Err(ApiError::Bind {
                port: config.port,
                reason: "address already in use".to_string(),
            });
        }

        let engine = Arc::new(LoopbackEngine {
            network: self.clone(),
            config: config.clone(),
            discovered: Mutex::new(BTreeMap::new()),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            locals: Mutex::new(BTreeMap::new()),
            next_instances: Mutex::new(HashMap::new()),
            terminated: AtomicBool::new(false),
        });
        state.engines.push(Arc::downgrade(&engine));
        state.created.push(config.clone());
        tracing::debug!("Created loopback endpoint on port {} (instance {})", config.port, config.instance_id);
        Ok(engine)
    }
}

struct LocalState {
    name: String,
    properties: BTreeMap<PropertyIdentifier, BacnetValue>,
    /// Present for commandable objects
    priority_array: Option<Vec<BacnetValue>>,
}

impl LocalState {
    fn effective_value(&self) -> Option<BacnetValue> {
        let slots = self.priority_array.as_ref()?;
        slots
            .iter()
            .find(|slot| !slot.is_null())
            .cloned()
            .or_else(|| self.properties.get(&PropertyIdentifier::RELINQUISH_DEFAULT).cloned())
    }
}

/// One endpoint on a [`LoopbackNetwork`].
pub struct LoopbackEngine {
    network: LoopbackNetwork,
    config: EndpointConfig,
    discovered: Mutex<BTreeMap<u32, RemoteDevice>>,
    listeners: Mutex<HashMap<u64, mpsc::Sender<EngineEvent>>>,
    next_listener: AtomicU64,
    locals: Mutex<BTreeMap<ObjectIdentifier, LocalState>>,
    next_instances: Mutex<HashMap<ObjectType, u32>>,
    terminated: AtomicBool,
}

impl LoopbackEngine {
    fn ensure_alive(&self) -> Result<()> {
        if self.terminated.load(Ordering::SeqCst) {
            Err(ApiError::Terminated)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: &EngineEvent) -> usize {
        let mut listeners = self.listeners.lock();
        listeners.retain(|_, sink| sink.send(event.clone()).is_ok());
        listeners.len()
    }
}

fn check_type(object: ObjectIdentifier, property: PropertyIdentifier, value: &BacnetValue) -> Result<()> {
    let Some(definition) = property_type(object.object_type, property) else {
        return Ok(());
    };
    if value.is_null() && definition.commandable {
        return Ok(());
    }
    if value.primitive_type() != definition.primitive {
        return Err(ApiError::InvalidDataType(format!(
            "{} of {} expects {:?}, got {:?}",
            property,
            object,
            definition.primitive,
            value.primitive_type()
        )));
    }
    Ok(())
}

fn is_read_only(property: PropertyIdentifier) -> bool {
    matches!(
        property,
        PropertyIdentifier::OBJECT_IDENTIFIER
            | PropertyIdentifier::OBJECT_TYPE
            | PropertyIdentifier::PROPERTY_LIST
            | PropertyIdentifier::STATUS_FLAGS
    )
}

impl ProtocolEngine for LoopbackEngine {
    fn instance_id(&self) -> u32 {
        self.config.instance_id
    }

    fn port(&self) -> u16 {
        self.config.port
    }

    fn broadcast_discovery(&self) -> Result<()> {
        self.ensure_alive()?;
        let mut state = self.network.state.lock();
        *state.discovery_broadcasts.entry(self.config.port).or_insert(0) += 1;

        let mut discovered = self.discovered.lock();
        for device in state.devices.values() {
            if device.reachable && device.address.port() == self.config.port {
                discovered.entry(device.instance).or_insert_with(|| device.remote());
            }
        }
        Ok(())
    }

    fn broadcast_i_am(&self) -> Result<()> {
        self.ensure_alive()?;
        self.network.state.lock().i_am_broadcasts += 1;
        Ok(())
    }

    fn broadcast_time_synchronization(&self, _time: SystemTime) -> Result<()> {
        self.ensure_alive()?;
        self.network.state.lock().time_synchronizations += 1;
        Ok(())
    }

    fn discovered_devices(&self) -> Vec<RemoteDevice> {
        self.discovered.lock().values().cloned().collect()
    }

    fn locate_device(&self, address: SocketAddr, instance: u32) -> Result<RemoteDevice> {
        self.ensure_alive()?;
        let remote = self.network.with_device(instance, |state, instance| {
            let device = &state.devices[&instance];
            if device.address.ip() != address.ip() {
                return Err(ApiError::Timeout { device: instance });
            }
            Ok(device.remote())
        })?;
        self.discovered.lock().insert(instance, remote.clone());
        Ok(remote)
    }

    fn fetch_extended_info(&self, device: &RemoteDevice) -> Result<DeviceInfo> {
        self.ensure_alive()?;
        self.network.with_device(device.instance, |state, instance| {
            let device = &state.devices[&instance];
            if !device.extended_info {
                return Err(ApiError::Network("segmentation not supported".to_string()));
            }
            Ok(DeviceInfo {
                name: Some(device.name.clone()),
                vendor_name: Some("Loopback".to_string()),
                model_name: Some("Simulated device".to_string()),
                max_apdu: Some(1476),
            })
        })
    }

    fn read_property(
        &self,
        device: &RemoteDevice,
        object: ObjectIdentifier,
        property: PropertyIdentifier,
    ) -> Result<BacnetValue> {
        self.ensure_alive()?;
        self.network.with_device(device.instance, |state, instance| {
            state.devices[&instance].read(object, property).map_err(|err| match err {
                PropertyError::UnknownObject => ApiError::UnknownObject(object),
                _ => ApiError::UnknownProperty { object, property },
            })
        })
    }

    fn read_properties(
        &self,
        device: &RemoteDevice,
        references: &[PropertyReference],
    ) -> Result<Vec<PropertyResult>> {
        self.ensure_alive()?;
        self.network.with_device(device.instance, |state, instance| {
            state.batch_reads += 1;
            let device = &state.devices[&instance];
            Ok(references
                .iter()
                .map(|reference| PropertyResult {
                    reference: *reference,
                    value: device.read(reference.object, reference.property),
                })
                .collect())
        })
    }

    fn write_property(
        &self,
        device: &RemoteDevice,
        object: ObjectIdentifier,
        property: PropertyIdentifier,
        value: BacnetValue,
        priority: Option<u8>,
    ) -> Result<()> {
        self.ensure_alive()?;
        self.network.with_device(device.instance, |state, instance| {
            let simulated = state.devices.get_mut(&instance).ok_or(ApiError::UnknownDevice(instance))?;
            if simulated.denied_writes.contains(&object) || is_read_only(property) {
                return Err(ApiError::WriteAccessDenied { object, property });
            }
            check_type(object, property, &value)?;
            let properties = simulated.objects.get_mut(&object).ok_or(ApiError::UnknownObject(object))?;
            if value.is_null() {
                let fallback = properties
                    .get(&PropertyIdentifier::RELINQUISH_DEFAULT)
                    .cloned()
                    .unwrap_or(BacnetValue::Null);
                properties.insert(property, fallback);
            } else {
                properties.insert(property, value.clone());
            }
            state.writes.push(WriteRecord { device: instance, object, property, value, priority });
            Ok(())
        })
    }

    fn subscribe_cov(
        &self,
        device: &RemoteDevice,
        process_id: u32,
        object: ObjectIdentifier,
        _confirmed: bool,
        _lifetime: u32,
    ) -> Result<()> {
        self.ensure_alive()?;
        let port = self.config.port;
        self.network.with_device(device.instance, |state, instance| {
            state.subscribe_calls += 1;
            let simulated = state.devices.get_mut(&instance).ok_or(ApiError::UnknownDevice(instance))?;
            if !simulated.objects.contains_key(&object) {
                return Err(ApiError::UnknownObject(object));
            }
            simulated.subscriptions.insert((port, process_id, object));
            Ok(())
        })
    }

    fn cancel_cov(&self, device: &RemoteDevice, process_id: u32, object: ObjectIdentifier) -> Result<()> {
        self.ensure_alive()?;
        let port = self.config.port;
        self.network.with_device(device.instance, |state, instance| {
            state.cancel_calls += 1;
            if let Some(simulated) = state.devices.get_mut(&instance) {
                simulated.subscriptions.remove(&(port, process_id, object));
            }
            Ok(())
        })
    }

    fn register_listener(&self, sink: mpsc::Sender<EngineEvent>) -> ListenerId {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().insert(id, sink);
        ListenerId(id)
    }

    fn unregister_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id.0);
    }

    fn next_instance(&self, object_type: ObjectType) -> u32 {
        let locals = self.locals.lock();
        let mut next = self.next_instances.lock();
        let counter = next.entry(object_type).or_insert(0);
        while locals.contains_key(&ObjectIdentifier::new(object_type, *counter)) {
            *counter += 1;
        }
        *counter
    }

    fn add_object(&self, object: LocalObject) -> Result<()> {
        self.ensure_alive()?;
        let mut locals = self.locals.lock();
        if locals.contains_key(&object.id) || locals.values().any(|local| local.name == object.name) {
            return Err(ApiError::DuplicateObject(object.name));
        }

        let mut properties = BTreeMap::new();
        properties.insert(PropertyIdentifier::OBJECT_IDENTIFIER, BacnetValue::ObjectIdentifier(object.id));
        properties.insert(PropertyIdentifier::OBJECT_NAME, BacnetValue::CharacterString(object.name.clone()));
        properties.insert(
            PropertyIdentifier::OBJECT_TYPE,
            BacnetValue::Enumerated(object.id.object_type.code() as u32),
        );
        properties.insert(PropertyIdentifier::STATUS_FLAGS, BacnetValue::BitString(vec![false; 4]));
        properties.insert(PropertyIdentifier::OUT_OF_SERVICE, BacnetValue::Boolean(false));
        properties.insert(PropertyIdentifier::PRESENT_VALUE, object.present_value.clone());
        if let Some(description) = &object.description {
            properties.insert(PropertyIdentifier::DESCRIPTION, BacnetValue::CharacterString(description.clone()));
        }
        if let Some(units) = object.units {
            properties.insert(PropertyIdentifier::UNITS, BacnetValue::EngineeringUnits(units));
        }
        if let Some(increment) = object.cov_increment {
            properties.insert(PropertyIdentifier::COV_INCREMENT, BacnetValue::Real(increment));
        }
        let priority_array = object.relinquish_default.as_ref().map(|default| {
            properties.insert(PropertyIdentifier::RELINQUISH_DEFAULT, default.clone());
            vec![BacnetValue::Null; 16]
        });

        locals.insert(object.id, LocalState { name: object.name, properties, priority_array });
        Ok(())
    }

    fn remove_object(&self, id: ObjectIdentifier) -> Result<()> {
        self.locals.lock().remove(&id).map(|_| ()).ok_or(ApiError::UnknownObject(id))
    }

    fn local_object(&self, name: &str) -> Option<ObjectIdentifier> {
        self.locals
            .lock()
            .iter()
            .find(|(_, local)| local.name == name)
            .map(|(id, _)| *id)
    }

    fn read_local(&self, id: ObjectIdentifier, property: PropertyIdentifier) -> Result<BacnetValue> {
        self.ensure_alive()?;
        let locals = self.locals.lock();
        let local = locals.get(&id).ok_or(ApiError::UnknownObject(id))?;
        local
            .properties
            .get(&property)
            .cloned()
            .ok_or(ApiError::UnknownProperty { object: id, property })
    }

    fn write_local(
        &self,
        id: ObjectIdentifier,
        property: PropertyIdentifier,
        value: BacnetValue,
        priority: Option<u8>,
    ) -> Result<()> {
        self.ensure_alive()?;
        if is_read_only(property) {
            return Err(ApiError::WriteAccessDenied { object: id, property });
        }
        check_type(id, property, &value)?;

        let changed = {
            let mut locals = self.locals.lock();
            let local = locals.get_mut(&id).ok_or(ApiError::UnknownObject(id))?;
            let previous = local.properties.get(&property).cloned();

            let commanded = property == PropertyIdentifier::PRESENT_VALUE && local.priority_array.is_some();
            let next = if commanded {
                let slot = usize::from(priority.unwrap_or(16).clamp(1, 16)) - 1;
                if let Some(slots) = local.priority_array.as_mut() {
                    slots[slot] = value;
                }
                local.effective_value().unwrap_or(BacnetValue::Null)
            } else if value.is_null() {
                return Err(ApiError::InvalidDataType(format!("{} of {} is not commandable", property, id)));
            } else {
                value
            };

            local.properties.insert(property, next.clone());
            (previous.as_ref() != Some(&next)).then_some(next)
        };

        if let Some(value) = changed {
            self.emit(&EngineEvent::LocalPropertyChanged { object: id, property, value });
        }
        Ok(())
    }

    fn terminate(&self) {
        if !self.terminated.swap(true, Ordering::SeqCst) {
            self.listeners.lock().clear();
            self.network.state.lock().terminated.push(self.config.port);
            tracing::debug!("Terminated loopback endpoint on port {}", self.config.port);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn endpoint(port: u16) -> EndpointConfig {
        EndpointConfig {
            port,
            instance_id: 10000,
            broadcast_address: Ipv4Addr::BROADCAST,
            bind_address: Ipv4Addr::UNSPECIFIED,
        }
    }

    fn network_with_device() -> LoopbackNetwork {
        let network = LoopbackNetwork::new();
        network.add_device(
            SimulatedDevice::new(1001, 47808)
                .named("AHU-1")
                .with_object(SimulatedObject::analog(
                    ObjectType::ANALOG_VALUE,
                    1,
                    "Setpoint",
                    21.0,
                    EngineeringUnits::DEGREES_CELSIUS,
                ))
                .with_object(SimulatedObject::binary(ObjectType::BINARY_VALUE, 2, "Fan", false)),
        );
        network
    }

    #[test]
    fn test_discovery_only_sees_devices_on_same_port() {
        let network = network_with_device();
        network.add_device(SimulatedDevice::new(2002, 47809));

        let engine = network.create(&endpoint(47808)).unwrap();
        engine.broadcast_discovery().unwrap();

        let found = engine.discovered_devices();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].instance, 1001);
        assert_eq!(network.discovery_broadcasts(47808), 1);
    }

    #[test]
    fn test_unreachable_device_times_out() {
        let network = network_with_device();
        let engine = network.create(&endpoint(47808)).unwrap();
        engine.broadcast_discovery().unwrap();
        let device = engine.discovered_devices().remove(0);

        network.set_reachable(1001, false);
        let err = engine.fetch_extended_info(&device).unwrap_err();
        assert!(err.is_unreachable());
    }

    #[test]
    fn test_notify_reaches_subscribed_endpoint_only() {
        let network = network_with_device();
        let engine = network.create(&endpoint(47808)).unwrap();
        engine.broadcast_discovery().unwrap();
        let device = engine.discovered_devices().remove(0);

        let (tx, rx) = mpsc::channel();
        engine.register_listener(tx);
        let object = ObjectIdentifier::new(ObjectType::ANALOG_VALUE, 1);

        assert_eq!(network.notify(1001, object, BacnetValue::Real(22.0)), 0);

        engine.subscribe_cov(&device, 0, object, true, 0).unwrap();
        assert_eq!(network.notify(1001, object, BacnetValue::Real(23.0)), 1);
        let event = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert!(matches!(event, EngineEvent::CovNotification { initiating_device: 1001, .. }));

        engine.cancel_cov(&device, 0, object).unwrap();
        assert!(network.active_subscriptions(1001).is_empty());
    }

    #[test]
    fn test_commandable_local_object_relinquish() {
        let network = LoopbackNetwork::new();
        let engine = network.create(&endpoint(47808)).unwrap();
        let id = ObjectIdentifier::new(ObjectType::ANALOG_VALUE, engine.next_instance(ObjectType::ANALOG_VALUE));
        engine
            .add_object(LocalObject::new(id, "Temp", BacnetValue::Real(0.0)).commandable(BacnetValue::Real(10.0)))
            .unwrap();

        engine.write_local(id, PropertyIdentifier::PRESENT_VALUE, BacnetValue::Real(5.0), Some(8)).unwrap();
        assert_eq!(engine.read_local(id, PropertyIdentifier::PRESENT_VALUE).unwrap(), BacnetValue::Real(5.0));

        engine.write_local(id, PropertyIdentifier::PRESENT_VALUE, BacnetValue::Null, Some(8)).unwrap();
        assert_eq!(engine.read_local(id, PropertyIdentifier::PRESENT_VALUE).unwrap(), BacnetValue::Real(10.0));
    }

    #[test]
    fn test_terminated_engine_rejects_calls() {
        let network = LoopbackNetwork::new();
        let engine = network.create(&endpoint(47808)).unwrap();
        engine.terminate();
        engine.terminate();
        assert!(matches!(engine.broadcast_discovery(), Err(ApiError::Terminated)));
        assert_eq!(network.terminated_endpoints(), vec![47808]);
    }

    #[test]
    fn test_bind_failure() {
        let network = LoopbackNetwork::new();
        network.fail_endpoint_creation(47809);
        assert!(matches!(network.create(&endpoint(47809)), Err(ApiError::Bind { port: 47809, .. })));
    }
}
