//! Client session bound to one remote device

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bacnet_api::definitions::auxiliary_properties;
use bacnet_api::{
    present_value_type, property_type, ApiError, BacnetValue, ObjectIdentifier, PropertyIdentifier,
    PropertyReference, PropertyResult, ProtocolEngine, RemoteDevice,
};
use bacnet_discovery::{keys, EndpointRegistry, LocalEndpoint, Settings};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use super::{describe, engine_error_flag, read_error_flag, Connection};
use crate::address::{ChannelAddress, ObjectReference};
use crate::channel::{ChannelRecordContainer, ChannelScanInfo, ChannelValueContainer, Flag, Record, ValueType};
use crate::config::AdapterConfig;
use crate::conversion::{self, object_type_mapping};
use crate::error::{AdapterError, Result};
use crate::iter::RecordListener;
use crate::subscription::{CovBackend, NotificationScope, SubscriptionManager, SubscriptionRequest};
use crate::worker::NotificationWorker;

/// Change-of-value subscription parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CovOptions {
    pub process_id: u32,
    /// Seconds, 0 for indefinite
    pub lifetime: u32,
    pub confirmed: bool,
}

impl Default for CovOptions {
    fn default() -> Self {
        Self {
            process_id: 0,
            lifetime: 0,
            confirmed: true,
        }
    }
}

impl From<&AdapterConfig> for CovOptions {
    fn from(config: &AdapterConfig) -> Self {
        Self {
            process_id: config.cov_process_id,
            lifetime: config.cov_lifetime,
            confirmed: config.cov_confirmed,
        }
    }
}

struct RemoteBackend<'a> {
    engine: &'a dyn ProtocolEngine,
    device: &'a RemoteDevice,
    options: CovOptions,
}

impl CovBackend for RemoteBackend<'_> {
    fn subscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()> {
        self.engine.subscribe_cov(
            self.device,
            self.options.process_id,
            object,
            self.options.confirmed,
            self.options.lifetime,
        )
    }

    fn unsubscribe(&self, object: ObjectIdentifier) -> bacnet_api::Result<()> {
        self.engine.cancel_cov(self.device, self.options.process_id, object)
    }
}

/// Session talking to a remote device through a shared local endpoint.
pub struct RemoteConnection {
    endpoint: LocalEndpoint,
    registry: Arc<EndpointRegistry>,
    device: RemoteDevice,
    write_priority: Option<u8>,
    cov: CovOptions,
    /// Object name -> identifier, filled by channel scans
    handles: RwLock<HashMap<String, ObjectIdentifier>>,
    subscriptions: Arc<SubscriptionManager>,
    worker: Mutex<Option<NotificationWorker>>,
    disconnected: AtomicBool,
}

impl RemoteConnection {
    /// Opens a session on `endpoint`, taking over the caller's reference to
    /// it. The reference is released if the session cannot start.
    pub(crate) fn new(
        endpoint: LocalEndpoint,
        registry: Arc<EndpointRegistry>,
        device: RemoteDevice,
        write_priority: Option<u8>,
        cov: CovOptions,
        poll_interval: Duration,
    ) -> Result<Self> {
        let subscriptions = Arc::new(SubscriptionManager::new(NotificationScope::Remote {
            device: device.instance,
        }));

        let worker = match NotificationWorker::start(
            format!("bacnet-cov-{}", device.instance),
            endpoint.engine(),
            Arc::clone(&subscriptions),
            poll_interval,
        ) {
            Ok(worker) => worker,
            Err(err) => {
                registry.release(&endpoint);
                return Err(err);
            }
        };

        tracing::debug!(
            "Connected to device {} at {} via local port {}",
            device.instance,
            device.address,
            endpoint.port()
        );

        Ok(Self {
            endpoint,
            registry,
            device,
            write_priority,
            cov,
            handles: RwLock::new(HashMap::new()),
            subscriptions,
            worker: Mutex::new(Some(worker)),
            disconnected: AtomicBool::new(false),
        })
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port()
    }

    pub fn device(&self) -> &RemoteDevice {
        &self.device
    }

    pub fn write_priority(&self) -> Option<u8> {
        self.write_priority
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of object names resolvable without a scan.
    pub fn cached_handles(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }

    fn engine(&self) -> &dyn ProtocolEngine {
        self.endpoint.engine().as_ref()
    }

    fn backend(&self) -> RemoteBackend<'_> {
        RemoteBackend {
            engine: self.engine(),
            device: &self.device,
            options: self.cov,
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(AdapterError::Disconnected)
        }
    }

    fn is_reachable(&self) -> bool {
        self.engine()
            .read_property(&self.device, self.device.object_identifier(), PropertyIdentifier::OBJECT_NAME)
            .is_ok()
    }

    /// A device that still answers failed the request itself; one that
    /// does not answer is a lost connection.
    fn classify(&self, err: ApiError, context: &str) -> AdapterError {
        if !err.is_unreachable() && self.is_reachable() {
            AdapterError::Scan(format!("{} of device {} failed: {}", context, self.device.instance, err))
        } else {
            AdapterError::Connection(format!("Device {} is not reachable: {}", self.device.instance, err))
        }
    }

    fn resolve(&self, object: &ObjectReference) -> Option<ObjectIdentifier> {
        match object {
            ObjectReference::Id(id) => Some(*id),
            ObjectReference::Name(name) => self.handles.read().get(name).copied(),
        }
    }

    /// Runs a channel scan when a name must be resolved and nothing is cached.
    fn ensure_handles<'a>(&self, pending: impl IntoIterator<Item = &'a ChannelAddress>) -> Result<()> {
        let needs_names = pending
            .into_iter()
            .any(|address| matches!(address.object, ObjectReference::Name(_)));
        if needs_names && self.handles.read().is_empty() {
            tracing::debug!("Handle cache of device {} is empty, scanning channels", self.device.instance);
            self.scan_for_channels("")?;
        }
        Ok(())
    }

    /// Resolves every container, flagging the ones that cannot be resolved.
    fn resolve_records(
        &self,
        containers: &mut [ChannelRecordContainer],
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<(usize, PropertyReference)>> {
        let parsed: Vec<_> = containers
            .iter()
            .map(|container| ChannelAddress::parse(&container.channel_address))
            .collect();

        self.ensure_handles(
            containers
                .iter()
                .zip(&parsed)
                .filter(|(container, _)| container.handle.is_none())
                .filter_map(|(_, address)| address.as_ref().ok()),
        )?;

        let mut targets = Vec::with_capacity(containers.len());
        for (index, (container, parsed)) in containers.iter_mut().zip(parsed).enumerate() {
            let address = match parsed {
                Ok(address) => address,
                Err(err) => {
                    tracing::debug!("{}", err);
                    container.set_flag(Flag::DriverErrorChannelAddressSyntaxInvalid, timestamp);
                    continue;
                }
            };

            match container.handle.or_else(|| self.resolve(&address.object)) {
                Some(object) => {
                    container.handle = Some(object);
                    targets.push((index, PropertyReference::new(object, address.property)));
                }
                None => {
                    tracing::debug!("No object named {} on device {}", address.object, self.device.instance);
                    container.set_flag(Flag::DriverErrorChannelWithThisAddressNotFound, timestamp);
                }
            }
        }
        Ok(targets)
    }

    fn write_one(&self, container: &mut ChannelValueContainer) -> Flag {
        let address = match ChannelAddress::parse(&container.channel_address) {
            Ok(address) => address,
            Err(err) => {
                tracing::debug!("{}", err);
                return Flag::DriverErrorChannelAddressSyntaxInvalid;
            }
        };

        let Some(object) = container.handle.or_else(|| self.resolve(&address.object)) else {
            return Flag::DriverErrorChannelWithThisAddressNotFound;
        };
        container.handle = Some(object);

        let Some(definition) = property_type(object.object_type, address.property) else {
            tracing::debug!("No type definition for {} of {}", address.property, object);
            return Flag::DriverErrorChannelValueTypeConversionException;
        };

        let value = match conversion::to_protocol(container.value.as_ref(), &definition) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("{}: {}", describe(object, &container.channel_address), err);
                return Flag::DriverErrorChannelValueTypeConversionException;
            }
        };

        match self
            .engine()
            .write_property(&self.device, object, address.property, value, self.write_priority)
        {
            Ok(()) => Flag::Valid,
            Err(err) => {
                tracing::warn!("Write to {} failed: {}", describe(object, &container.channel_address), err);
                engine_error_flag(&err)
            }
        }
    }

    /// One descriptor per (object, auxiliary property), read in one batch.
    fn scan_auxiliary(&self, objects: &[(String, ObjectIdentifier)]) -> Result<Vec<ChannelScanInfo>> {
        let references: Vec<PropertyReference> = objects
            .iter()
            .flat_map(|(_, object)| {
                auxiliary_properties(object.object_type)
                    .iter()
                    .map(|property| PropertyReference::new(*object, *property))
            })
            .collect();
        if references.is_empty() {
            return Ok(Vec::new());
        }

        let results = self
            .engine()
            .read_properties(&self.device, &references)
            .map_err(|err| self.classify(err, "Parameter list scan"))?;

        let names: HashMap<ObjectIdentifier, &str> =
            objects.iter().map(|(name, object)| (*object, name.as_str())).collect();

        let mut channels = Vec::new();
        for result in results {
            let PropertyReference { object, property } = result.reference;
            let Ok(value) = result.value else {
                continue;
            };
            let Some(name) = names.get(&object) else {
                continue;
            };

            let definition = property_type(object.object_type, property);
            channels.push(ChannelScanInfo {
                channel_address: format!("{}#{}", name, property),
                description: format!("{} {}", name, property),
                value_type: definition
                    .as_ref()
                    .map(conversion::reported_value_type)
                    .unwrap_or(ValueType::String),
                value_type_length: None,
                readable: true,
                writable: definition
                    .map(|definition| conversion::value_type(definition.primitive).is_some())
                    .unwrap_or(false),
                metadata: metadata(Some(&value), None),
            });
        }
        Ok(channels)
    }
}

fn metadata(value: Option<&BacnetValue>, units: Option<&BacnetValue>) -> String {
    let render = |value: Option<&BacnetValue>| value.map(ToString::to_string).unwrap_or_default();
    format!("value={};u={}", render(value), render(units))
}

fn lookup(results: &[PropertyResult], property: PropertyIdentifier) -> Option<&BacnetValue> {
    results
        .iter()
        .find(|result| result.reference.property == property)
        .and_then(|result| result.value.as_ref().ok())
}

impl Connection for RemoteConnection {
    fn scan_for_channels(&self, settings: &str) -> Result<Vec<ChannelScanInfo>> {
        self.ensure_connected()?;
        let settings = Settings::parse(settings)?;
        let parameter_list = settings.flag(keys::PARAMETER_LIST);

        let engine = self.engine();
        let device_id = self.device.object_identifier();

        engine
            .read_property(&self.device, device_id, PropertyIdentifier::OBJECT_NAME)
            .map_err(|err| AdapterError::Connection(format!("Device {} is not reachable: {}", self.device.instance, err)))?;

        let object_list = engine
            .read_property(&self.device, device_id, PropertyIdentifier::OBJECT_LIST)
            .map_err(|err| self.classify(err, "Object list read"))?;

        let mut channels = Vec::new();
        let mut handles = HashMap::new();
        let mut expanded = Vec::new();

        for object in object_list.object_identifiers() {
            let Some(mapping) = object_type_mapping(object.object_type) else {
                continue;
            };

            let mut references = vec![
                PropertyReference::new(object, PropertyIdentifier::OBJECT_NAME),
                PropertyReference::new(object, PropertyIdentifier::DESCRIPTION),
                PropertyReference::new(object, PropertyIdentifier::PRESENT_VALUE),
            ];
            if property_type(object.object_type, PropertyIdentifier::UNITS).is_some() {
                references.push(PropertyReference::new(object, PropertyIdentifier::UNITS));
            }

            let results = engine
                .read_properties(&self.device, &references)
                .map_err(|err| self.classify(err, "Channel scan"))?;

            let name = match lookup(&results, PropertyIdentifier::OBJECT_NAME) {
                Some(BacnetValue::CharacterString(name)) => name.clone(),
                Some(other) => other.to_string(),
                None => object.to_string(),
            };
            if name.contains('.') {
                tracing::debug!("Skipping compound object {} ({})", name, object);
                continue;
            }

            channels.push(ChannelScanInfo {
                channel_address: name.clone(),
                description: lookup(&results, PropertyIdentifier::DESCRIPTION)
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                value_type: mapping.value_type,
                value_type_length: None,
                readable: true,
                writable: mapping.writable,
                metadata: metadata(
                    lookup(&results, PropertyIdentifier::PRESENT_VALUE),
                    lookup(&results, PropertyIdentifier::UNITS),
                ),
            });
            handles.insert(name.clone(), object);
            if parameter_list {
                expanded.push((name, object));
            }
        }

        if parameter_list {
            channels.extend(self.scan_auxiliary(&expanded)?);
        }

        tracing::debug!(
            "Channel scan of device {} found {} channels",
            self.device.instance,
            channels.len()
        );
        // replaced, so names of removed or renamed objects stop resolving
        *self.handles.write() = handles;
        Ok(channels)
    }

    fn read(&self, containers: &mut [ChannelRecordContainer]) -> Result<()> {
        self.ensure_connected()?;
        let timestamp = Utc::now();
        let targets = self.resolve_records(containers, timestamp)?;
        if targets.is_empty() {
            return Ok(());
        }

        let references: Vec<PropertyReference> = targets.iter().map(|(_, reference)| *reference).collect();
        let results = match self.engine().read_properties(&self.device, &references) {
            Ok(results) => results,
            Err(err) if err.is_unreachable() || matches!(err, ApiError::Terminated) => {
                return Err(AdapterError::Connection(format!(
                    "Read from device {} failed: {}",
                    self.device.instance, err
                )));
            }
            Err(err) => {
                tracing::warn!("Batched read from device {} failed: {}", self.device.instance, err);
                for (index, _) in &targets {
                    containers[*index].set_flag(Flag::DriverErrorReadFailure, timestamp);
                }
                return Ok(());
            }
        };

        for (slot, (index, reference)) in targets.iter().enumerate() {
            let result = results
                .get(slot)
                .filter(|result| result.reference == *reference)
                .or_else(|| results.iter().find(|result| result.reference == *reference));

            let record = match result {
                None => Record::flagged(Flag::DriverErrorReadFailure, timestamp),
                Some(PropertyResult { value: Err(err), .. }) => {
                    tracing::debug!("Reading {:?} failed: {}", reference, err);
                    Record::flagged(read_error_flag(err), timestamp)
                }
                Some(PropertyResult { value: Ok(value), .. }) => {
                    match property_type(reference.object.object_type, reference.property) {
                        None => Record::flagged(Flag::DriverErrorChannelValueTypeConversionException, timestamp),
                        Some(definition) => match conversion::to_generic(value, &definition) {
                            Ok(converted) => Record::new(converted, timestamp),
                            Err(err) => {
                                tracing::debug!("{}", err);
                                Record::flagged(Flag::DriverErrorChannelValueTypeConversionException, timestamp)
                            }
                        },
                    }
                }
            };
            containers[*index].record = Some(record);
        }
        Ok(())
    }

    fn write(&self, containers: &mut [ChannelValueContainer]) -> Result<()> {
        self.ensure_connected()?;

        let parsed: Vec<_> = containers
            .iter()
            .filter(|container| container.handle.is_none())
            .filter_map(|container| ChannelAddress::parse(&container.channel_address).ok())
            .collect();
        self.ensure_handles(&parsed)?;

        for container in containers.iter_mut() {
            container.flag = Some(self.write_one(container));
        }
        Ok(())
    }

    fn start_listening(&self, containers: &mut [ChannelRecordContainer], listener: RecordListener) -> Result<()> {
        self.ensure_connected()?;
        let timestamp = Utc::now();
        let targets = self.resolve_records(containers, timestamp)?;

        let requests = targets
            .iter()
            .map(|(index, reference)| SubscriptionRequest {
                index: *index,
                object: reference.object,
                container: containers[*index].clone(),
                definition: present_value_type(reference.object.object_type),
            })
            .collect();

        for (index, err) in self.subscriptions.replace(&self.backend(), requests, listener) {
            containers[index].set_flag(engine_error_flag(&err), timestamp);
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.subscriptions.cancel_all(&self.backend());
        if let Some(mut worker) = self.worker.lock().take() {
            worker.stop(self.engine());
        }
        self.registry.release(&self.endpoint);

        tracing::debug!("Disconnected from device {}", self.device.instance);
        Ok(())
    }
}

impl Drop for RemoteConnection {
    fn drop(&mut self) {
        if let Err(err) = self.disconnect() {
            tracing::warn!("Failed to disconnect from device {}: {}", self.device.instance, err);
        }
    }
}
