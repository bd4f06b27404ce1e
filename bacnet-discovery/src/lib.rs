//! BACnet/IP endpoint management and device discovery
//!
//! This crate owns the adapter's network presence:
//!
//! - [`EndpointRegistry`] shares one local endpoint per UDP port between any
//!   number of scanners and sessions, reference-counting them and
//!   terminating each when its last holder lets go
//! - [`DeviceScanner`] broadcasts Who-Is across one port or the well-known
//!   port range and reports respondents as [`ScanEvent`]s
//! - [`DeviceCache`] remembers found devices by instance number so a later
//!   connect does not need to rescan
//! - [`Settings`] and [`DeviceAddress`] parse the host's textual formats
//!
//! # Scanning
//!
//! ```no_run
//! use std::sync::Arc;
//! use bacnet_discovery::{DeviceCache, DeviceScanner, EndpointRegistry, ScanEvent, ScanOptions};
//! # fn factory() -> Arc<dyn bacnet_api::EngineFactory> { unimplemented!() }
//!
//! let registry = Arc::new(EndpointRegistry::new(factory()));
//! let scanner = DeviceScanner::new(registry, Arc::new(DeviceCache::new()));
//!
//! scanner.scan(&ScanOptions::default(), &mut |event| match event {
//!     ScanEvent::Found(device) => println!("{} at {}", device.description, device.address),
//!     ScanEvent::Progress(percent) => println!("{}%", percent),
//! })?;
//! # Ok::<(), bacnet_discovery::DiscoveryError>(())
//! ```

pub mod device;
mod error;
pub mod registry;
pub mod scanner;
pub mod settings;

pub use device::{CachedDevice, DeviceAddress, DeviceCache, DeviceScanInfo, MAX_DEVICE_INSTANCE};
pub use error::{DiscoveryError, Result};
pub use registry::{EndpointRegistry, EndpointRequest, LocalEndpoint, DEFAULT_PORT};
pub use scanner::{DeviceScanner, ScanEvent, ScanOptions, ScanState, SCAN_PORTS};
pub use settings::{keys, Settings, SettingsError};
