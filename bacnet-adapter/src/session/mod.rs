//! Connected sessions
//!
//! A session is what `connect` hands back: either a client of a remote
//! device or the host of a local server device. Both answer the same
//! [`Connection`] operations; [`BacnetConnection`] dispatches between them.

mod remote;
mod server;

pub use remote::{CovOptions, RemoteConnection};
pub use server::ServerConnection;

use bacnet_api::{ApiError, ObjectIdentifier, PropertyError};

use crate::channel::{ChannelRecordContainer, ChannelScanInfo, ChannelValueContainer, Flag};
use crate::error::Result;
use crate::iter::RecordListener;

/// Operations the host framework performs on a connected device.
///
/// Per-channel failures are reported as flags on the containers; an `Err`
/// means the call as a whole failed.
pub trait Connection: Send + Sync {
    /// Lists the channels the device exposes. `settings` may carry
    /// `parameterlist=true` to include auxiliary properties.
    fn scan_for_channels(&self, settings: &str) -> Result<Vec<ChannelScanInfo>>;

    /// Reads every container, filling in its record.
    fn read(&self, containers: &mut [ChannelRecordContainer]) -> Result<()>;

    /// Writes every container, filling in its flag.
    fn write(&self, containers: &mut [ChannelValueContainer]) -> Result<()>;

    /// Replaces the session's subscriptions with `containers`; records are
    /// pushed to `listener` as notifications arrive.
    fn start_listening(&self, containers: &mut [ChannelRecordContainer], listener: RecordListener) -> Result<()>;

    /// Cancels subscriptions and releases the endpoint. Idempotent.
    fn disconnect(&self) -> Result<()>;
}

/// A session of either kind.
pub enum BacnetConnection {
    Remote(RemoteConnection),
    Server(ServerConnection),
}

impl BacnetConnection {
    pub fn is_server(&self) -> bool {
        matches!(self, BacnetConnection::Server(_))
    }

    pub fn port(&self) -> u16 {
        match self {
            BacnetConnection::Remote(connection) => connection.port(),
            BacnetConnection::Server(connection) => connection.port(),
        }
    }
}

impl Connection for BacnetConnection {
    fn scan_for_channels(&self, settings: &str) -> Result<Vec<ChannelScanInfo>> {
        match self {
            BacnetConnection::Remote(connection) => connection.scan_for_channels(settings),
            BacnetConnection::Server(connection) => connection.scan_for_channels(settings),
        }
    }

    fn read(&self, containers: &mut [ChannelRecordContainer]) -> Result<()> {
        match self {
            BacnetConnection::Remote(connection) => connection.read(containers),
            BacnetConnection::Server(connection) => connection.read(containers),
        }
    }

    fn write(&self, containers: &mut [ChannelValueContainer]) -> Result<()> {
        match self {
            BacnetConnection::Remote(connection) => connection.write(containers),
            BacnetConnection::Server(connection) => connection.write(containers),
        }
    }

    fn start_listening(&self, containers: &mut [ChannelRecordContainer], listener: RecordListener) -> Result<()> {
        match self {
            BacnetConnection::Remote(connection) => connection.start_listening(containers, listener),
            BacnetConnection::Server(connection) => connection.start_listening(containers, listener),
        }
    }

    fn disconnect(&self) -> Result<()> {
        match self {
            BacnetConnection::Remote(connection) => connection.disconnect(),
            BacnetConnection::Server(connection) => connection.disconnect(),
        }
    }
}

impl From<RemoteConnection> for BacnetConnection {
    fn from(connection: RemoteConnection) -> Self {
        BacnetConnection::Remote(connection)
    }
}

impl From<ServerConnection> for BacnetConnection {
    fn from(connection: ServerConnection) -> Self {
        BacnetConnection::Server(connection)
    }
}

/// Flag for a failed read of one entry.
fn read_error_flag(err: &PropertyError) -> Flag {
    match err {
        PropertyError::UnknownObject | PropertyError::UnknownProperty => {
            Flag::DriverErrorChannelWithThisAddressNotFound
        }
        PropertyError::ReadAccessDenied => Flag::AccessMethodNotSupported,
        PropertyError::Other(_) => Flag::DriverErrorReadFailure,
    }
}

/// Flag for a failed single-property operation.
fn engine_error_flag(err: &ApiError) -> Flag {
    match err {
        ApiError::WriteAccessDenied { .. } => Flag::AccessMethodNotSupported,
        ApiError::UnknownObject(_) | ApiError::UnknownProperty { .. } => {
            Flag::DriverErrorChannelWithThisAddressNotFound
        }
        ApiError::InvalidDataType(_) => Flag::DriverErrorChannelValueTypeConversionException,
        ApiError::Timeout { .. } => Flag::DriverErrorTimeout,
        ApiError::UnknownDevice(_) | ApiError::Network(_) | ApiError::Terminated => {
            Flag::DriverErrorChannelNotAccessible
        }
        _ => Flag::UnknownError,
    }
}

/// Identity of a resolved channel, for log messages.
fn describe(object: ObjectIdentifier, address: &str) -> String {
    format!("{} ({})", address, object)
}
