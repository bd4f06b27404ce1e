//! # BACnet Adapter
//!
//! A sync-first adapter exposing BACnet/IP devices to a data-acquisition
//! framework as typed, flagged channels.
//!
//! ## Overview
//!
//! The adapter sits between a host framework and an external protocol
//! engine (see [`bacnet_api::ProtocolEngine`]). It discovers devices,
//! maps `object[#property]` channel addresses onto protocol objects,
//! converts values both ways and turns change-of-value notifications into
//! pushed records. It can also host a device of its own, materializing
//! local objects from a static channel configuration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bacnet_adapter::prelude::*;
//!
//! let driver = BacnetDriver::new(factory);
//!
//! driver.scan_for_devices("discoverySleepTime=500", &mut |event| {
//!     if let ScanEvent::Found(device) = event {
//!         println!("{} -> {} ({})", device.description, device.address, device.settings);
//!     }
//! })?;
//!
//! let connection = driver.connect("1001", "remoteDevicePort=47808")?;
//! let mut channels = vec![ChannelRecordContainer::new("temp", "Room1Temp")];
//! connection.read(&mut channels)?;
//!
//! let (listener, records) = records_channel();
//! connection.start_listening(&mut channels, listener)?;
//! for batch in records.timeout_iter(std::time::Duration::from_secs(5)) {
//!     println!("{:?}", batch[0].record);
//! }
//!
//! connection.disconnect()?;
//! ```
//!
//! ## Architecture
//!
//! - [`BacnetDriver`] owns the shared endpoint registry and device cache
//!   from `bacnet_discovery`; every session holds one endpoint reference
//!   and gives it back on disconnect.
//! - [`session::RemoteConnection`] resolves channel names through a cache
//!   filled by channel scans and batches reads into one request.
//! - [`session::ServerConnection`] hosts local objects; the last session on
//!   an endpoint takes them down with it.
//! - Each session routes engine events on its own worker thread into a
//!   [`subscription::SubscriptionManager`], which delivers converted
//!   records to the listener.

pub mod address;
pub mod channel;
pub mod config;
pub mod conversion;
pub mod driver;
pub mod error;
pub mod iter;
pub mod logging;
pub mod session;
pub mod subscription;
pub mod time_sync;
mod worker;

pub use address::{AddressError, ChannelAddress, ObjectReference, UnitSpec};
pub use channel::{
    ChannelRecordContainer, ChannelScanInfo, ChannelValueContainer, Flag, Record, RecordBatch, Value, ValueType,
};
pub use config::{AdapterConfig, ChannelConfig, ServerDeviceConfig};
pub use conversion::ConversionError;
pub use driver::{BacnetDriver, DriverInfo, DRIVER_INFO};
pub use error::{AdapterError, Result};
pub use iter::{records_channel, RecordListener, RecordReceiver};
pub use session::{BacnetConnection, Connection};
pub use time_sync::TimeSyncTask;

pub use bacnet_discovery::ScanEvent;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        records_channel, AdapterConfig, AdapterError, BacnetConnection, BacnetDriver, ChannelRecordContainer,
        ChannelValueContainer, Connection, Flag, RecordReceiver, Result, ScanEvent, ServerDeviceConfig, Value,
    };
}
