//! `key=value;key=value` settings strings
//!
//! Settings arrive from the host as one flat string per device or scan
//! request. Keys and values are trimmed; an empty or blank string means no
//! settings at all. Every non-empty entry must contain exactly one `=` with
//! a non-empty key and value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known setting keys.
pub mod keys {
    pub const DISCOVERY_SLEEP_TIME: &str = "discoverySleepTime";
    pub const SCAN_PORT: &str = "scanPort";
    pub const BROADCAST_IP: &str = "broadcastIP";
    pub const LOCAL_BIND_ADDRESS: &str = "localBindAddress";
    pub const LOCAL_DEVICE_PORT: &str = "localDevicePort";
    pub const LOCAL_INSTANCE_NUMBER: &str = "localInstanceNumber";
    pub const REMOTE_DEVICE_PORT: &str = "remoteDevicePort";
    pub const HOST_IP: &str = "hostIp";
    pub const IS_SERVER: &str = "isServer";
    pub const WRITE_PRIORITY: &str = "writePriority";
    pub const PARAMETER_LIST: &str = "parameterlist";
}

const ENTRY_SEPARATOR: char = ';';
const KEY_VALUE_SEPARATOR: char = '=';

/// Error produced while parsing or reading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// An entry that is not exactly `key=value`
    InvalidEntry(String),
    /// A value that does not parse as the type the key requires
    InvalidValue { key: String, value: String, reason: String },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidEntry(entry) => write!(f, "Invalid property '{}'", entry),
            SettingsError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value '{}' for '{}': {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

/// Parsed settings, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a settings string. Blank input yields empty settings.
    pub fn parse(input: &str) -> Result<Self, SettingsError> {
        let mut entries = BTreeMap::new();

        for entry in input.split(ENTRY_SEPARATOR) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let mut tokens = entry.split(KEY_VALUE_SEPARATOR);
            let (key, value) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(key), Some(value), None) => (key.trim(), value.trim()),
                _ => return Err(SettingsError::InvalidEntry(entry.to_string())),
            };
            if key.is_empty() || value.is_empty() {
                return Err(SettingsError::InvalidEntry(entry.to_string()));
            }

            entries.insert(key.to_string(), value.to_string());
        }

        Ok(Self { entries })
    }

    /// Like [`parse`](Self::parse) but treats `None` as empty settings.
    pub fn parse_optional(input: Option<&str>) -> Result<Self, SettingsError> {
        input.map_or_else(|| Ok(Self::new()), Self::parse)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses the value under `key`, `Ok(None)` when the key is absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, SettingsError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|err| SettingsError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Port number under `key`, either decimal or `0x`-prefixed hex
    /// (`47808` and `0xBAC0` are the same port).
    pub fn get_port(&self, key: &str) -> Result<Option<u16>, SettingsError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => raw.parse::<u16>(),
        };
        parsed.map(Some).map_err(|err| SettingsError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        })
    }

    /// Boolean flag; anything other than a case-insensitive `true` is false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, "{}", ENTRY_SEPARATOR)?;
            }
            write!(f, "{}{}{}", key, KEY_VALUE_SEPARATOR, value)?;
        }
        Ok(())
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
