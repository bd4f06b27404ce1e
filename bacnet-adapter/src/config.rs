//! Configuration for the adapter and for hosted server devices
//!
//! [`AdapterConfig`] tunes driver-wide behaviour such as scan timing and
//! change-of-value subscription parameters. [`ServerDeviceConfig`] describes
//! one device the adapter hosts itself: its address, settings and the
//! channels to materialize as local objects.

use std::ops::RangeInclusive;
use std::time::Duration;

use bacnet_discovery::registry::DEFAULT_INSTANCE_BASE;
use bacnet_discovery::scanner::DEFAULT_SETTLE_TIME;
use bacnet_discovery::{DEFAULT_PORT, SCAN_PORTS};
use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, Result};

/// Driver-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Wait between a Who-Is broadcast and enumeration of respondents
    /// Default: 2000 ms
    #[serde(with = "millis")]
    pub discovery_settle_time: Duration,

    /// Ports walked by a scan without `scanPort`
    /// Default: 0xBAC0..=0xBACF
    pub scan_ports: RangeInclusive<u16>,

    /// Remote port assumed when settings carry no `remoteDevicePort`
    /// Default: 47808
    pub default_port: u16,

    /// First instance number given to local endpoints
    /// Default: 10000
    pub endpoint_instance_base: u32,

    /// Subscriber process id used for change-of-value subscriptions
    /// Default: 0
    pub cov_process_id: u32,

    /// Subscription lifetime in seconds, 0 for indefinite
    /// Default: 0
    pub cov_lifetime: u32,

    /// Request confirmed notifications
    /// Default: true
    pub cov_confirmed: bool,

    /// How often notification workers check for shutdown
    /// Default: 100 ms
    #[serde(with = "millis")]
    pub notification_poll_interval: Duration,

    /// Interval of time-synchronization broadcasts
    /// Default: 60 s
    #[serde(with = "millis")]
    pub time_sync_interval: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            discovery_settle_time: DEFAULT_SETTLE_TIME,
            scan_ports: SCAN_PORTS,
            default_port: DEFAULT_PORT,
            endpoint_instance_base: DEFAULT_INSTANCE_BASE,
            cov_process_id: 0,
            cov_lifetime: 0,
            cov_confirmed: true,
            notification_poll_interval: Duration::from_millis(100),
            time_sync_interval: Duration::from_secs(60),
        }
    }
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short settle time, for networks where devices answer quickly
    pub fn fast_scan() -> Self {
        Self {
            discovery_settle_time: Duration::from_millis(200),
            notification_poll_interval: Duration::from_millis(20),
            ..Default::default()
        }
    }

    /// Scans and connects on a single port only
    pub fn single_port(port: u16) -> Self {
        Self {
            scan_ports: port..=port,
            default_port: port,
            ..Default::default()
        }
    }

    pub fn with_settle_time(mut self, settle_time: Duration) -> Self {
        self.discovery_settle_time = settle_time;
        self
    }

    pub fn with_cov(mut self, process_id: u32, lifetime: u32, confirmed: bool) -> Self {
        self.cov_process_id = process_id;
        self.cov_lifetime = lifetime;
        self.cov_confirmed = confirmed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan_ports.is_empty() {
            return Err(AdapterError::Configuration(
                "Invalid scan port range: start must not exceed end".to_string(),
            ));
        }

        if self.notification_poll_interval == Duration::ZERO {
            return Err(AdapterError::Configuration(
                "Notification poll interval must be greater than 0".to_string(),
            ));
        }

        if self.time_sync_interval == Duration::ZERO {
            return Err(AdapterError::Configuration(
                "Time sync interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// One channel of a hosted server device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelConfig {
    pub id: String,
    /// `objectName[#property]`
    pub channel_address: String,
    /// `objectType;engineeringUnit`, required for present-value channels
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ChannelConfig {
    pub fn new(id: impl Into<String>, channel_address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel_address: channel_address.into(),
            unit: None,
            description: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A device hosted by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDeviceConfig {
    /// Address the host connects with, matched verbatim
    pub device_address: String,
    #[serde(default)]
    pub settings: String,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl ServerDeviceConfig {
    pub fn new(device_address: impl Into<String>) -> Self {
        Self {
            device_address: device_address.into(),
            settings: String::new(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
