//! Device addresses, scan results and the remote-device cache.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use bacnet_api::RemoteDevice;
use dashmap::DashMap;

use crate::error::DiscoveryError;
use crate::settings::{keys, Settings};

/// Highest device instance a host may address (4194303 is the wildcard).
pub const MAX_DEVICE_INSTANCE: u32 = 4_194_302;

const ADDRESS_SEPARATOR: char = ';';

/// Parsed `instanceNumber[;hostIp]` device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    pub instance: u32,
    /// Connect directly to this host instead of rescanning
    pub host: Option<IpAddr>,
}

impl DeviceAddress {
    pub fn new(instance: u32) -> Self {
        Self { instance, host: None }
    }

    pub fn with_host(instance: u32, host: IpAddr) -> Self {
        Self { instance, host: Some(host) }
    }
}

impl FromStr for DeviceAddress {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(ADDRESS_SEPARATOR);
        let instance_part = parts.next().unwrap_or_default().trim();
        let host_part = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(DiscoveryError::InvalidAddress(format!("too many fields in '{}'", s)));
        }

        let instance = instance_part
            .parse::<u32>()
            .map_err(|_| DiscoveryError::InvalidAddress(format!("'{}' is not a device instance number", instance_part)))?;
        if instance > MAX_DEVICE_INSTANCE {
            return Err(DiscoveryError::InvalidAddress(format!(
                "device instance {} out of range [0, {}]",
                instance, MAX_DEVICE_INSTANCE
            )));
        }

        let host = match host_part {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<IpAddr>()
                    .map_err(|_| DiscoveryError::InvalidAddress(format!("'{}' is not an IP address", raw)))?,
            ),
        };

        Ok(Self { instance, host })
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host {
            Some(host) => write!(f, "{}{}{}", self.instance, ADDRESS_SEPARATOR, host),
            None => write!(f, "{}", self.instance),
        }
    }
}

/// One device reported by a scan, in the host's address/settings vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceScanInfo {
    /// `instance;host`, usable to reconnect without rescanning
    pub address: String,
    /// `broadcastIP=..;remoteDevicePort=..`
    pub settings: String,
    pub description: String,
}

impl DeviceScanInfo {
    pub fn from_device(device: &RemoteDevice, port: u16, broadcast: Ipv4Addr) -> Self {
        let address = DeviceAddress::with_host(device.instance, device.address.ip());

        let mut settings = Settings::new();
        settings.insert(keys::BROADCAST_IP, broadcast.to_string());
        settings.insert(keys::REMOTE_DEVICE_PORT, port.to_string());

        let description = device
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("device {}", device.instance));

        Self {
            address: address.to_string(),
            settings: settings.to_string(),
            description,
        }
    }
}

/// A remote device together with the local port it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDevice {
    pub device: RemoteDevice,
    pub port: u16,
}

/// Remote devices seen by scans or direct lookups, keyed by instance number.
#[derive(Debug, Default)]
pub struct DeviceCache {
    devices: DashMap<u32, CachedDevice>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, device: RemoteDevice, port: u16) {
        self.devices.insert(device.instance, CachedDevice { device, port });
    }

    pub fn get(&self, instance: u32) -> Option<CachedDevice> {
        self.devices.get(&instance).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, instance: u32) -> Option<CachedDevice> {
        self.devices.remove(&instance).map(|(_, cached)| cached)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn clear(&self) {
        self.devices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacnet_api::DeviceInfo;
    use rstest::rstest;
    use std::net::SocketAddr;

    #[rstest]
    #[case("1001", 1001, None)]
    #[case("0", 0, None)]
    #[case("4194302", 4194302, None)]
    #[case("1001;192.168.1.20", 1001, Some("192.168.1.20"))]
    #[case(" 7 ; 10.0.0.5 ", 7, Some("10.0.0.5"))]
    #[case("7;", 7, None)]
    fn test_parse_device_address(#[case] input: &str, #[case] instance: u32, #[case] host: Option<&str>) {
        let address: DeviceAddress = input.parse().unwrap();
        assert_eq!(address.instance, instance);
        assert_eq!(address.host, host.map(|h| h.parse().unwrap()));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-1")]
    #[case("4194303")]
    #[case("1001;not-an-ip")]
    #[case("1001;10.0.0.1;extra")]
    fn test_invalid_device_address(#[case] input: &str) {
        assert!(matches!(input.parse::<DeviceAddress>(), Err(DiscoveryError::InvalidAddress(_))));
    }

    #[test]
    fn test_device_address_display() {
        assert_eq!(DeviceAddress::new(5).to_string(), "5");
        let address = DeviceAddress::with_host(5, "10.0.0.9".parse().unwrap());
        assert_eq!(address.to_string(), "5;10.0.0.9");
        assert_eq!(address.to_string().parse::<DeviceAddress>().unwrap(), address);
    }

    #[test]
    fn test_scan_info_uses_name_when_known() {
        let mut device = RemoteDevice::new(12, SocketAddr::from(([192, 168, 0, 4], 47809)));
        let info = DeviceScanInfo::from_device(&device, 47809, Ipv4Addr::BROADCAST);
        assert_eq!(info.address, "12;192.168.0.4");
        assert_eq!(info.settings, "broadcastIP=255.255.255.255;remoteDevicePort=47809");
        assert_eq!(info.description, "device 12");

        device.info = Some(DeviceInfo { name: Some("Boiler".to_string()), ..Default::default() });
        assert_eq!(DeviceScanInfo::from_device(&device, 47809, Ipv4Addr::BROADCAST).description, "Boiler");
    }

    #[test]
    fn test_device_cache() {
        let cache = DeviceCache::new();
        let device = RemoteDevice::new(3, SocketAddr::from(([127, 0, 0, 1], 47808)));
        cache.insert(device.clone(), 47808);

        let cached = cache.get(3).unwrap();
        assert_eq!(cached.device, device);
        assert_eq!(cached.port, 47808);
        assert!(cache.get(4).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
