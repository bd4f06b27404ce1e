//! Who-Is device scanning
//!
//! A scan walks one port or the well-known port range 0xBAC0..=0xBACF.
//! Per port it obtains an endpoint, broadcasts Who-Is, waits a settle time
//! and then enumerates whoever answered, reporting each device through the
//! caller's listener. Interruption is cooperative: the flag is checked
//! between ports and between devices, never in the middle of a request.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::device::{DeviceCache, DeviceScanInfo};
use crate::error::{DiscoveryError, Result};
use crate::registry::{EndpointRegistry, EndpointRequest, LocalEndpoint};
use crate::settings::{keys, Settings};

/// Ports scanned when no `scanPort` is configured.
pub const SCAN_PORTS: RangeInclusive<u16> = 0xBAC0..=0xBACF;

/// Default wait between the Who-Is broadcast and enumeration.
pub const DEFAULT_SETTLE_TIME: Duration = Duration::from_millis(2000);

/// Scan parameters, usually derived from a settings string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Scan only this port
    pub port: Option<u16>,
    pub ports: RangeInclusive<u16>,
    pub broadcast_address: Option<Ipv4Addr>,
    pub bind_address: Option<Ipv4Addr>,
    pub local_instance: Option<u32>,
    pub settle_time: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            port: None,
            ports: SCAN_PORTS,
            broadcast_address: None,
            bind_address: None,
            local_instance: None,
            settle_time: DEFAULT_SETTLE_TIME,
        }
    }
}

impl ScanOptions {
    /// Reads scan options from settings, starting from `defaults`.
    ///
    /// An unparsable `discoverySleepTime` keeps the default settle time;
    /// any other malformed value is an error.
    pub fn from_settings(settings: &Settings, defaults: ScanOptions) -> Result<Self> {
        let settle_time = match settings.get_parsed::<u64>(keys::DISCOVERY_SLEEP_TIME) {
            Ok(Some(millis)) => Duration::from_millis(millis),
            Ok(None) => defaults.settle_time,
            Err(err) => {
                tracing::warn!("{}; using default of {:?}", err, defaults.settle_time);
                defaults.settle_time
            }
        };

        Ok(Self {
            port: settings.get_port(keys::SCAN_PORT)?.or(defaults.port),
            ports: defaults.ports,
            broadcast_address: settings.get_parsed(keys::BROADCAST_IP)?.or(defaults.broadcast_address),
            bind_address: settings.get_parsed(keys::LOCAL_BIND_ADDRESS)?.or(defaults.bind_address),
            local_instance: settings.get_parsed(keys::LOCAL_INSTANCE_NUMBER)?.or(defaults.local_instance),
            settle_time,
        })
    }

    fn request(&self, port: u16) -> EndpointRequest {
        EndpointRequest::for_port(port)
            .broadcast(self.broadcast_address)
            .bind(self.bind_address)
            .instance(self.local_instance)
    }
}

/// Where a scanner currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// Broadcast sent, waiting out the settle time
    ScanningPort(u16),
    /// Enumerating respondents of a port
    Collecting(u16),
    Interrupted,
}

/// Events reported to the scan listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A device answered
    Found(DeviceScanInfo),
    /// Percentage of the port range completed
    Progress(u8),
}

/// Drives discovery broadcasts and fills the shared device cache.
pub struct DeviceScanner {
    registry: Arc<EndpointRegistry>,
    cache: Arc<DeviceCache>,
    interrupted: AtomicBool,
    state: Mutex<ScanState>,
    /// Endpoints on which this scanner keeps one reference alive, by port
    held: Mutex<HashMap<u16, LocalEndpoint>>,
}

impl DeviceScanner {
    pub fn new(registry: Arc<EndpointRegistry>, cache: Arc<DeviceCache>) -> Self {
        Self {
            registry,
            cache,
            interrupted: AtomicBool::new(false),
            state: Mutex::new(ScanState::Idle),
            held: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    /// Asks a running scan to stop at its next checkpoint.
    pub fn interrupt(&self) {
        tracing::debug!("Device scan interrupt requested");
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Scans for devices, reporting each through `listener`.
    ///
    /// Returns the number of devices found, or [`DiscoveryError::Interrupted`]
    /// when [`interrupt`](Self::interrupt) was called during the scan.
    pub fn scan(&self, options: &ScanOptions, listener: &mut dyn FnMut(ScanEvent)) -> Result<usize> {
        self.interrupted.store(false, Ordering::SeqCst);
        let result = self.run(options, listener);
        self.set_state(match result {
            Err(DiscoveryError::Interrupted) => ScanState::Interrupted,
            _ => ScanState::Idle,
        });
        result
    }

    fn run(&self, options: &ScanOptions, listener: &mut dyn FnMut(ScanEvent)) -> Result<usize> {
        if let Some(port) = options.port {
            let found = self.scan_port(port, options, listener)?;
            return if self.is_interrupted() { Err(DiscoveryError::Interrupted) } else { Ok(found) };
        }

        let ports: Vec<u16> = options.ports.clone().collect();
        let mut found = 0;
        for (index, port) in ports.iter().enumerate() {
            found += self.scan_port(*port, options, listener)?;

            let progress = ((index + 1) * 100 / ports.len()) as u8;
            listener(ScanEvent::Progress(progress));

            if self.is_interrupted() {
                tracing::debug!("Device scan interrupted after port {}", port);
                return Err(DiscoveryError::Interrupted);
            }
        }
        Ok(found)
    }

    fn scan_port(&self, port: u16, options: &ScanOptions, listener: &mut dyn FnMut(ScanEvent)) -> Result<usize> {
        self.set_state(ScanState::ScanningPort(port));
        let endpoint = self.registry.obtain(&options.request(port))?;
        let engine = endpoint.engine();

        if let Err(err) = engine.broadcast_discovery() {
            self.registry.release(&endpoint);
            return Err(err.into());
        }
        thread::sleep(options.settle_time);

        self.set_state(ScanState::Collecting(port));
        let devices = engine.discovered_devices();
        if devices.is_empty() {
            tracing::debug!("No devices answered on port {}", port);
            self.registry.release(&endpoint);
            return Ok(0);
        }

        for mut device in devices.iter().cloned() {
            if self.is_interrupted() {
                tracing::debug!("Skipping extended info of device {} after interrupt", device.instance);
            } else {
                match engine.fetch_extended_info(&device) {
                    Ok(info) => device.info = Some(info),
                    Err(err) => tracing::warn!(
                        "Failed to fetch extended info of device {} on port {}: {}",
                        device.instance,
                        port,
                        err
                    ),
                }
            }

            let info = DeviceScanInfo::from_device(&device, port, endpoint.broadcast_address());
            tracing::debug!("Found device {} at {} on port {}", device.instance, device.address, port);
            self.cache.insert(device, port);
            listener(ScanEvent::Found(info));
        }

        // one reference per port is enough to keep cached devices usable
        let count = devices.len();
        let previous = self.held.lock().insert(port, endpoint.clone());
        match previous {
            Some(previous) if previous.generation() == endpoint.generation() => self.registry.release(&endpoint),
            Some(previous) => self.registry.release(&previous),
            None => {}
        }
        Ok(count)
    }

    /// Drops the endpoint references kept for ports with found devices.
    pub fn release_held(&self) {
        let held: Vec<LocalEndpoint> = self.held.lock().drain().map(|(_, endpoint)| endpoint).collect();
        for endpoint in &held {
            self.registry.release(endpoint);
        }
    }

    fn set_state(&self, state: ScanState) {
        *self.state.lock() = state;
    }
}
