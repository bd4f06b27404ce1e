//! Session hosting local objects on behalf of a configured server device
//!
//! Channels are materialized once, at construction. Present-value channels
//! create objects; auxiliary-property channels attach to an object created
//! by an earlier present-value channel of the same session. A channel that
//! cannot be materialized stays invalid for the lifetime of the session
//! and every operation on it reports the configuration-error flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bacnet_api::{
    present_value_type, property_type, BacnetValue, BinaryPv, LocalObject, ObjectIdentifier, ObjectType,
    PropertyIdentifier, ProtocolEngine,
};
use bacnet_discovery::{EndpointRegistry, LocalEndpoint};
use chrono::Utc;
use parking_lot::Mutex;

use super::{describe, engine_error_flag, Connection};
use crate::address::{ChannelAddress, ObjectReference, UnitSpec};
use crate::channel::{ChannelRecordContainer, ChannelScanInfo, ChannelValueContainer, Flag, Record};
use crate::config::{ChannelConfig, ServerDeviceConfig};
use crate::conversion;
use crate::error::{AdapterError, Result};
use crate::iter::RecordListener;
use crate::subscription::{CovBackend, NotificationScope, SubscriptionManager, SubscriptionRequest};
use crate::worker::NotificationWorker;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ServerChannel {
    Valid {
        object: ObjectIdentifier,
        property: PropertyIdentifier,
    },
    Invalid(String),
}

/// Local objects need no subscription round trip.
struct LocalBackend;

impl CovBackend for LocalBackend {
    fn subscribe(&self, _object: ObjectIdentifier) -> bacnet_api::Result<()> {
        Ok(())
    }

    fn unsubscribe(&self, _object: ObjectIdentifier) -> bacnet_api::Result<()> {
        Ok(())
    }
}

pub struct ServerConnection {
    endpoint: LocalEndpoint,
    registry: Arc<EndpointRegistry>,
    device_address: String,
    /// Keyed by channel address; the first definition of an address wins
    channels: HashMap<String, ServerChannel>,
    /// Objects created by this session, in creation order
    created: Vec<ObjectIdentifier>,
    write_priority: Option<u8>,
    subscriptions: Arc<SubscriptionManager>,
    worker: Mutex<Option<NotificationWorker>>,
    disconnected: AtomicBool,
}

impl ServerConnection {
    /// Materializes the configured channels on `endpoint`, taking over the
    /// caller's reference to it. The reference is released on failure.
    pub(crate) fn new(
        endpoint: LocalEndpoint,
        registry: Arc<EndpointRegistry>,
        config: &ServerDeviceConfig,
        write_priority: Option<u8>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let engine = Arc::clone(endpoint.engine());

        let mut entries: Vec<(&ChannelConfig, _)> = config
            .channels
            .iter()
            .map(|channel| (channel, ChannelAddress::parse(&channel.channel_address)))
            .collect();
        entries.sort_by_key(|(_, parsed)| !matches!(parsed, Ok(address) if address.is_present_value()));

        let mut names = HashMap::new();
        let mut created = Vec::new();
        let mut channels = HashMap::new();

        for (channel, parsed) in entries {
            let state = parsed
                .map_err(|err| err.to_string())
                .and_then(|address| materialize(engine.as_ref(), &address, channel, &mut names, &mut created))
                .map(|(object, property)| ServerChannel::Valid { object, property })
                .unwrap_or_else(|reason| {
                    tracing::warn!("Server channel '{}' is invalid: {}", channel.id, reason);
                    ServerChannel::Invalid(reason)
                });
            channels.entry(channel.channel_address.clone()).or_insert(state);
        }

        if let Err(err) = engine.broadcast_i_am() {
            tracing::warn!("Failed to announce server device {}: {}", config.device_address, err);
        }

        let subscriptions = Arc::new(SubscriptionManager::new(NotificationScope::Local));
        let worker = match NotificationWorker::start(
            format!("bacnet-server-{}", endpoint.port()),
            &engine,
            Arc::clone(&subscriptions),
            poll_interval,
        ) {
            Ok(worker) => worker,
            Err(err) => {
                remove_objects(engine.as_ref(), &created);
                registry.release(&endpoint);
                return Err(err);
            }
        };

        tracing::debug!(
            "Server device {} hosts {} objects on port {}",
            config.device_address,
            created.len(),
            endpoint.port()
        );

        Ok(Self {
            endpoint,
            registry,
            device_address: config.device_address.clone(),
            channels,
            created,
            write_priority,
            subscriptions,
            worker: Mutex::new(Some(worker)),
            disconnected: AtomicBool::new(false),
        })
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port()
    }

    pub fn device_address(&self) -> &str {
        &self.device_address
    }

    /// Objects hosted by this session, in creation order.
    pub fn objects(&self) -> &[ObjectIdentifier] {
        &self.created
    }

    /// True if the channel was configured and could be materialized.
    pub fn is_valid_channel(&self, channel_address: &str) -> bool {
        matches!(self.channels.get(channel_address), Some(ServerChannel::Valid { .. }))
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn engine(&self) -> &dyn ProtocolEngine {
        self.endpoint.engine().as_ref()
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.disconnected.load(Ordering::SeqCst) {
            Err(AdapterError::Disconnected)
        } else {
            Ok(())
        }
    }

    fn lookup(&self, channel_address: &str) -> std::result::Result<(ObjectIdentifier, PropertyIdentifier), Flag> {
        match self.channels.get(channel_address) {
            Some(ServerChannel::Valid { object, property }) => Ok((*object, *property)),
            Some(ServerChannel::Invalid(_)) => Err(Flag::DriverErrorChannelAddressSyntaxInvalid),
            None => Err(Flag::DriverErrorChannelWithThisAddressNotFound),
        }
    }

    fn read_one(&self, object: ObjectIdentifier, property: PropertyIdentifier) -> std::result::Result<BacnetValue, Flag> {
        let value = self.engine().read_local(object, property).map_err(|err| {
            tracing::debug!("Local read of {} of {} failed: {}", property, object, err);
            match engine_error_flag(&err) {
                Flag::DriverErrorChannelWithThisAddressNotFound => Flag::DriverErrorChannelWithThisAddressNotFound,
                _ => Flag::DriverErrorReadFailure,
            }
        })?;
        Ok(value)
    }

    fn write_one(&self, container: &mut ChannelValueContainer) -> Flag {
        let (object, property) = match self.lookup(&container.channel_address) {
            Ok(target) => target,
            Err(flag) => return flag,
        };
        container.handle = Some(object);

        let Some(definition) = property_type(object.object_type, property) else {
            return Flag::DriverErrorChannelValueTypeConversionException;
        };
        let value = match conversion::to_protocol(container.value.as_ref(), &definition) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("{}: {}", describe(object, &container.channel_address), err);
                return Flag::DriverErrorChannelValueTypeConversionException;
            }
        };

        match self.engine().write_local(object, property, value, self.write_priority) {
            Ok(()) => Flag::Valid,
            Err(err) => {
                tracing::warn!("Local write to {} failed: {}", describe(object, &container.channel_address), err);
                engine_error_flag(&err)
            }
        }
    }
}

/// Creates or attaches the object behind one channel.
fn materialize(
    engine: &dyn ProtocolEngine,
    address: &ChannelAddress,
    channel: &ChannelConfig,
    names: &mut HashMap<String, ObjectIdentifier>,
    created: &mut Vec<ObjectIdentifier>,
) -> std::result::Result<(ObjectIdentifier, PropertyIdentifier), String> {
    let ObjectReference::Name(name) = &address.object else {
        return Err("server channels must address objects by name".to_string());
    };

    if !address.is_present_value() {
        return names
            .get(name)
            .map(|object| (*object, address.property))
            .ok_or_else(|| format!("no present value channel defines object '{}'", name));
    }

    if names.contains_key(name) {
        return Err(format!("object '{}' is defined more than once", name));
    }

    let unit = channel.unit.as_deref().ok_or("missing unit spec")?;
    let spec = UnitSpec::parse(unit).map_err(|err| err.to_string())?;
    let object = ObjectIdentifier::new(spec.object_type, engine.next_instance(spec.object_type));

    let local = match spec.object_type {
        ObjectType::ANALOG_VALUE => LocalObject::new(object, name.clone(), BacnetValue::Real(0.0))
            .with_units(spec.units)
            .with_cov_increment(1.0)
            .commandable(BacnetValue::Real(0.0)),
        ObjectType::BINARY_VALUE => {
            LocalObject::new(object, name.clone(), BacnetValue::BinaryPv(BinaryPv::Inactive))
        }
        other => return Err(format!("object type {} cannot be hosted", other)),
    };
    let local = match &channel.description {
        Some(description) => local.with_description(description.clone()),
        None => local,
    };

    engine.add_object(local).map_err(|err| err.to_string())?;
    created.push(object);
    names.insert(name.clone(), object);
    Ok((object, PropertyIdentifier::PRESENT_VALUE))
}

fn remove_objects(engine: &dyn ProtocolEngine, created: &[ObjectIdentifier]) {
    for object in created.iter().rev() {
        if let Err(err) = engine.remove_object(*object) {
            tracing::warn!("Failed to remove local object {}: {}", object, err);
        }
    }
}

impl Connection for ServerConnection {
    fn scan_for_channels(&self, _settings: &str) -> Result<Vec<ChannelScanInfo>> {
        Err(AdapterError::UnsupportedOperation("scanForChannels on a server device"))
    }

    fn read(&self, containers: &mut [ChannelRecordContainer]) -> Result<()> {
        self.ensure_connected()?;
        let timestamp = Utc::now();

        for container in containers.iter_mut() {
            let record = match self.lookup(&container.channel_address) {
                Err(flag) => Record::flagged(flag, timestamp),
                Ok((object, property)) => {
                    container.handle = Some(object);
                    match self.read_one(object, property) {
                        Err(flag) => Record::flagged(flag, timestamp),
                        Ok(value) => match property_type(object.object_type, property)
                            .map(|definition| conversion::to_generic(&value, &definition))
                        {
                            Some(Ok(converted)) => Record::new(converted, timestamp),
                            _ => Record::flagged(Flag::DriverErrorChannelValueTypeConversionException, timestamp),
                        },
                    }
                }
            };
            container.record = Some(record);
        }
        Ok(())
    }

    fn write(&self, containers: &mut [ChannelValueContainer]) -> Result<()> {
        self.ensure_connected()?;
        for container in containers.iter_mut() {
            container.flag = Some(self.write_one(container));
        }
        Ok(())
    }

    /// Subscribes to local present-value changes and immediately delivers
    /// the current value of every listened channel.
    fn start_listening(&self, containers: &mut [ChannelRecordContainer], listener: RecordListener) -> Result<()> {
        self.ensure_connected()?;
        let timestamp = Utc::now();

        let mut requests = Vec::new();
        for (index, container) in containers.iter_mut().enumerate() {
            match self.lookup(&container.channel_address) {
                Ok((object, _)) => {
                    container.handle = Some(object);
                    requests.push(SubscriptionRequest {
                        index,
                        object,
                        container: container.clone(),
                        definition: present_value_type(object.object_type),
                    });
                }
                Err(flag) => container.set_flag(flag, timestamp),
            }
        }

        let targets: Vec<(usize, ObjectIdentifier)> =
            requests.iter().map(|request| (request.index, request.object)).collect();
        for (index, err) in self.subscriptions.replace(&LocalBackend, requests, listener) {
            containers[index].set_flag(engine_error_flag(&err), timestamp);
        }

        for (index, object) in targets {
            match self.engine().read_local(object, PropertyIdentifier::PRESENT_VALUE) {
                Ok(value) => {
                    self.subscriptions.publish(object, &value);
                }
                Err(err) => {
                    tracing::debug!("No initial value for {}: {}", object, err);
                    containers[index].set_flag(Flag::DriverErrorReadFailure, timestamp);
                }
            }
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.subscriptions.cancel_all(&LocalBackend);
        if let Some(mut worker) = self.worker.lock().take() {
            worker.stop(self.engine());
        }
        remove_objects(self.engine(), &self.created);
        self.registry.release(&self.endpoint);

        tracing::debug!("Server device {} stopped", self.device_address);
        Ok(())
    }
}

impl Drop for ServerConnection {
    fn drop(&mut self) {
        if let Err(err) = self.disconnect() {
            tracing::warn!("Failed to stop server device {}: {}", self.device_address, err);
        }
    }
}
