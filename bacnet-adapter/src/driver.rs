//! Driver facade
//!
//! [`BacnetDriver`] is the entry point a host framework talks to. It owns the
//! endpoint registry, the device cache and the scanner, and hands out
//! sessions via [`BacnetDriver::connect`].

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use bacnet_api::{EngineFactory, RemoteDevice};
use bacnet_discovery::{
    keys, DeviceAddress, DeviceCache, DeviceScanner, DiscoveryError, EndpointRegistry, EndpointRequest,
    LocalEndpoint, ScanEvent, ScanOptions, Settings,
};
use parking_lot::RwLock;

use crate::config::{AdapterConfig, ServerDeviceConfig};
use crate::error::{AdapterError, Result};
use crate::session::{BacnetConnection, CovOptions, RemoteConnection, ServerConnection};
use crate::time_sync::TimeSyncTask;

/// Static description of the driver for the host's configuration UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverInfo {
    pub id: &'static str,
    pub description: &'static str,
    pub device_address_syntax: &'static str,
    pub settings_syntax: &'static str,
    pub channel_address_syntax: &'static str,
    pub device_scan_settings_syntax: &'static str,
}

pub const DRIVER_INFO: DriverInfo = DriverInfo {
    id: "bacnet",
    description: "BACnet/IP communication protocol driver",
    device_address_syntax: "<instance_number>[;<host_ip>]",
    settings_syntax: "[broadcastIP=<ip>][;localBindAddress=<ip>][;localDevicePort=<port>]\
[;localInstanceNumber=<n>][;remoteDevicePort=<port>][;writePriority=<1..16>][;isServer=true]",
    channel_address_syntax: "<object_name|object_type:instance>[#<property_name>]",
    device_scan_settings_syntax: "[discoverySleepTime=<ms>][;scanPort=<port>][;broadcastIP=<ip>]",
};

/// Connection settings derived from a settings string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConnectSettings {
    remote_port: u16,
    local_port: u16,
    broadcast_address: Option<Ipv4Addr>,
    bind_address: Option<Ipv4Addr>,
    local_instance: Option<u32>,
    write_priority: Option<u8>,
    is_server: bool,
}

impl ConnectSettings {
    fn from_settings(settings: &Settings, default_port: u16) -> Result<Self> {
        let remote_port = settings.get_port(keys::REMOTE_DEVICE_PORT)?.unwrap_or(default_port);
        let write_priority: Option<u8> = settings.get_parsed(keys::WRITE_PRIORITY)?;
        if let Some(priority) = write_priority {
            if !(1..=16).contains(&priority) {
                return Err(AdapterError::Configuration(format!(
                    "writePriority must be between 1 and 16, got {}",
                    priority
                )));
            }
        }

        Ok(Self {
            remote_port,
            local_port: settings.get_port(keys::LOCAL_DEVICE_PORT)?.unwrap_or(remote_port),
            broadcast_address: settings.get_parsed(keys::BROADCAST_IP)?,
            bind_address: settings.get_parsed(keys::LOCAL_BIND_ADDRESS)?,
            local_instance: settings.get_parsed(keys::LOCAL_INSTANCE_NUMBER)?,
            write_priority,
            is_server: settings.flag(keys::IS_SERVER),
        })
    }

    fn endpoint_request(&self) -> EndpointRequest {
        EndpointRequest::for_port(self.local_port)
            .broadcast(self.broadcast_address)
            .bind(self.bind_address)
            .instance(self.local_instance)
    }
}

pub struct BacnetDriver {
    config: AdapterConfig,
    registry: Arc<EndpointRegistry>,
    cache: Arc<DeviceCache>,
    scanner: DeviceScanner,
    server_devices: RwLock<Vec<ServerDeviceConfig>>,
}

impl BacnetDriver {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self::build(factory, AdapterConfig::default())
    }

    /// Creates a driver with `config`, rejecting it if it fails
    /// [`AdapterConfig::validate`].
    pub fn with_config(factory: Arc<dyn EngineFactory>, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(factory, config))
    }

    fn build(factory: Arc<dyn EngineFactory>, config: AdapterConfig) -> Self {
        let registry = Arc::new(EndpointRegistry::with_instance_base(factory, config.endpoint_instance_base));
        let cache = Arc::new(DeviceCache::new());
        let scanner = DeviceScanner::new(Arc::clone(&registry), Arc::clone(&cache));

        Self {
            config,
            registry,
            cache,
            scanner,
            server_devices: RwLock::new(Vec::new()),
        }
    }

    pub fn info(&self) -> &'static DriverInfo {
        &DRIVER_INFO
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<DeviceCache> {
        &self.cache
    }

    /// Makes a server device available to `connect` with `isServer=true`.
    pub fn register_server_device(&self, config: ServerDeviceConfig) {
        let mut devices = self.server_devices.write();
        devices.retain(|existing| existing.device_address != config.device_address);
        devices.push(config);
    }

    pub fn server_devices(&self) -> Vec<ServerDeviceConfig> {
        self.server_devices.read().clone()
    }

    fn scan_defaults(&self) -> ScanOptions {
        ScanOptions {
            ports: self.config.scan_ports.clone(),
            settle_time: self.config.discovery_settle_time,
            ..ScanOptions::default()
        }
    }

    /// Scans for devices, reporting each one and the progress to `listener`.
    ///
    /// Returns the number of devices found, or `Interrupted` if
    /// [`interrupt_device_scan`](Self::interrupt_device_scan) was called.
    pub fn scan_for_devices(&self, settings: &str, listener: &mut dyn FnMut(ScanEvent)) -> Result<usize> {
        let settings = Settings::parse(settings)?;
        let options = ScanOptions::from_settings(&settings, self.scan_defaults())?;
        Ok(self.scanner.scan(&options, listener)?)
    }

    pub fn interrupt_device_scan(&self) {
        self.scanner.interrupt();
    }

    /// Opens a session to the device at `device_address`.
    pub fn connect(&self, device_address: &str, settings: &str) -> Result<BacnetConnection> {
        let address: DeviceAddress = device_address.parse().map_err(AdapterError::from)?;
        let parsed = Settings::parse(settings)?;
        let connect = ConnectSettings::from_settings(&parsed, self.config.default_port)?;

        if connect.is_server {
            return self.connect_server(device_address, &parsed, &connect);
        }

        let endpoint = self.obtain(&connect)?;
        match self.resolve_device(&endpoint, &address, &connect) {
            Ok(device) => RemoteConnection::new(
                endpoint,
                Arc::clone(&self.registry),
                device,
                connect.write_priority,
                CovOptions::from(&self.config),
                self.config.notification_poll_interval,
            )
            .map(BacnetConnection::from),
            Err(err) => {
                self.registry.release(&endpoint);
                Err(err)
            }
        }
    }

    fn obtain(&self, connect: &ConnectSettings) -> Result<LocalEndpoint> {
        self.registry.obtain(&connect.endpoint_request()).map_err(|err| {
            AdapterError::Connection(format!(
                "Failed to open local endpoint on port {}: {}",
                connect.local_port, err
            ))
        })
    }

    fn connect_server(&self, device_address: &str, settings: &Settings, connect: &ConnectSettings) -> Result<BacnetConnection> {
        let config = self
            .server_devices
            .read()
            .iter()
            .find(|config| {
                config.device_address == device_address.trim()
                    && (config.settings.trim().is_empty()
                        || Settings::parse(&config.settings).as_ref() == Ok(settings))
            })
            .cloned()
            .ok_or_else(|| {
                AdapterError::Configuration(format!("No server configuration for device '{}'", device_address))
            })?;

        let endpoint = self.obtain(connect)?;
        ServerConnection::new(
            endpoint,
            Arc::clone(&self.registry),
            &config,
            connect.write_priority,
            self.config.notification_poll_interval,
        )
        .map(BacnetConnection::from)
    }

    /// Finds the device in the cache, by direct lookup at its host, or by
    /// rescanning its port, and verifies that it answers.
    fn resolve_device(
        &self,
        endpoint: &LocalEndpoint,
        address: &DeviceAddress,
        connect: &ConnectSettings,
    ) -> Result<RemoteDevice> {
        let engine = endpoint.engine();

        if self.cache.get(address.instance).is_none() {
            match address.host {
                Some(host) => {
                    let device = engine
                        .locate_device(SocketAddr::new(host, connect.remote_port), address.instance)
                        .map_err(|err| {
                            AdapterError::Connection(format!("Could not locate device {}: {}", address, err))
                        })?;
                    self.cache.insert(device, connect.remote_port);
                }
                None => {
                    let options = ScanOptions {
                        port: Some(connect.remote_port),
                        broadcast_address: connect.broadcast_address,
                        bind_address: connect.bind_address,
                        ..self.scan_defaults()
                    };
                    match self.scanner.scan(&options, &mut |_| {}) {
                        Ok(_) | Err(DiscoveryError::Interrupted) => {}
                        Err(err) => return Err(AdapterError::Connection(err.to_string())),
                    }
                }
            }
        }

        let mut device = self
            .cache
            .get(address.instance)
            .map(|cached| cached.device)
            .ok_or_else(|| AdapterError::Connection(format!("Could not find device {}", address)))?;

        let info = engine
            .fetch_extended_info(&device)
            .map_err(|err| AdapterError::Connection(format!("Couldn't reach device {}: {}", address, err)))?;
        device.info = Some(info);

        let port = self
            .cache
            .get(address.instance)
            .map(|cached| cached.port)
            .unwrap_or(connect.remote_port);
        self.cache.insert(device.clone(), port);
        Ok(device)
    }

    /// Starts periodic time-synchronization broadcasts on `port`.
    pub fn start_time_sync(&self, port: u16) -> Result<TimeSyncTask> {
        let endpoint = self
            .registry
            .obtain(&EndpointRequest::for_port(port))
            .map_err(|err| AdapterError::Connection(err.to_string()))?;
        TimeSyncTask::start(endpoint, Arc::clone(&self.registry), self.config.time_sync_interval)
    }

    /// Releases every endpoint and forgets cached devices.
    pub fn shutdown(&self) {
        self.scanner.interrupt();
        self.scanner.release_held();
        self.registry.release_all();
        self.cache.clear();
        tracing::debug!("BACnet driver shut down");
    }
}

impl Drop for BacnetDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(input: &str) -> Settings {
        Settings::parse(input).unwrap()
    }

    #[test]
    fn test_connect_settings_defaults() {
        let connect = ConnectSettings::from_settings(&Settings::new(), 47808).unwrap();
        assert_eq!(connect.remote_port, 47808);
        assert_eq!(connect.local_port, 47808);
        assert_eq!(connect.write_priority, None);
        assert!(!connect.is_server);
    }

    #[test]
    fn test_local_port_follows_remote_port() {
        let connect = ConnectSettings::from_settings(&settings("remoteDevicePort=47809"), 47808).unwrap();
        assert_eq!(connect.local_port, 47809);

        let connect =
            ConnectSettings::from_settings(&settings("remoteDevicePort=47809;localDevicePort=47810"), 47808).unwrap();
        assert_eq!(connect.local_port, 47810);
    }

    #[test]
    fn test_hex_ports() {
        let connect =
            ConnectSettings::from_settings(&settings("remoteDevicePort=0xBAC1;localDevicePort=0xBAC2"), 47808).unwrap();
        assert_eq!(connect.remote_port, 47809);
        assert_eq!(connect.local_port, 47810);
    }

    #[test]
    fn test_write_priority_range() {
        assert_eq!(
            ConnectSettings::from_settings(&settings("writePriority=8"), 47808)
                .unwrap()
                .write_priority,
            Some(8)
        );
        assert!(ConnectSettings::from_settings(&settings("writePriority=0"), 47808).is_err());
        assert!(ConnectSettings::from_settings(&settings("writePriority=17"), 47808).is_err());
        assert!(ConnectSettings::from_settings(&settings("writePriority=high"), 47808).is_err());
    }

    #[test]
    fn test_driver_info() {
        assert_eq!(DRIVER_INFO.id, "bacnet");
    }
}
