//! Core types for the bluelink connection manager
//!
//! This module defines the fundamental types used throughout the crate,
//! using newtype patterns for semantic validation and type safety.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::LinkError;

// ----------------------------------------------------------------------------
// Device Address
// ----------------------------------------------------------------------------

/// 48-bit Bluetooth hardware address (`AA:BB:CC:DD:EE:FF`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceAddress([u8; 6]);

/// Length of the canonical colon-separated display form
pub const ADDRESS_DISPLAY_LEN: usize = 17;

impl DeviceAddress {
    /// Create a new address from 6 raw bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for DeviceAddress {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LinkError::InvalidAddress {
            value: s.to_string(),
        };

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            if part.len() != 2 {
                return Err(invalid());
            }
            let mut decoded = [0u8; 1];
            hex::decode_to_slice(part, &mut decoded).map_err(|_| invalid())?;
            bytes[i] = decoded[0];
        }

        Ok(Self(bytes))
    }
}

// ----------------------------------------------------------------------------
// Discovered Device
// ----------------------------------------------------------------------------

/// A device reported by the Link Provider during a discovery cycle
///
/// Ephemeral: batches are not persisted across discovery cycles. The paired
/// flag is carried as its own field; presentation decides how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub address: DeviceAddress,
    pub name: String,
    pub paired: bool,
}

impl DiscoveredDevice {
    pub fn new(address: DeviceAddress, name: impl Into<String>, paired: bool) -> Self {
        Self {
            address,
            name: name.into(),
            paired,
        }
    }
}

impl fmt::Display for DiscoveredDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.address)
    }
}

// ----------------------------------------------------------------------------
// Timestamp
// ----------------------------------------------------------------------------

/// Millisecond timestamp since Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a new timestamp
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Current wall-clock timestamp
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_millis() as u64)
    }

    /// Get the raw milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Duration elapsed since another timestamp (saturating)
    pub fn duration_since(&self, other: Self) -> core::time::Duration {
        core::time::Duration::from_millis(self.0.saturating_sub(other.0))
    }
}

// ----------------------------------------------------------------------------
// Time Source Trait
// ----------------------------------------------------------------------------

/// Trait for providing timestamps, so tests can control the clock
pub trait TimeSource {
    /// Get the current timestamp
    fn now(&self) -> Timestamp;
}

/// Standard wall-clock implementation of [`TimeSource`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trip() {
        let addr: DeviceAddress = "98:D3:31:80:89:AF".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0x98, 0xD3, 0x31, 0x80, 0x89, 0xAF]);
        assert_eq!(addr.to_string(), "98:D3:31:80:89:AF");
    }

    #[test]
    fn test_address_lowercase_accepted() {
        let addr: DeviceAddress = "98:d3:31:80:89:af".parse().unwrap();
        assert_eq!(addr.to_string(), "98:D3:31:80:89:AF");
    }

    #[test]
    fn test_address_rejects_malformed() {
        assert!("98:D3:31:80:89".parse::<DeviceAddress>().is_err());
        assert!("98-D3-31-80-89-AF".parse::<DeviceAddress>().is_err());
        assert!("98:D3:31:80:89:ZZ".parse::<DeviceAddress>().is_err());
        assert!("".parse::<DeviceAddress>().is_err());
    }

    #[test]
    fn test_display_len_matches_constant() {
        let addr: DeviceAddress = "11:22:33:44:55:66".parse().unwrap();
        assert_eq!(addr.to_string().len(), ADDRESS_DISPLAY_LEN);
    }

    #[test]
    fn test_device_display() {
        let addr: DeviceAddress = "11:22:33:44:55:66".parse().unwrap();
        let device = DiscoveredDevice::new(addr, "HC-05", false);
        assert_eq!(device.to_string(), "HC-05, 11:22:33:44:55:66");
    }

    #[test]
    fn test_timestamp_duration_since() {
        let earlier = Timestamp::new(1_000);
        let later = Timestamp::new(4_000);
        assert_eq!(later.duration_since(earlier).as_millis(), 3_000);
        assert_eq!(earlier.duration_since(later).as_millis(), 0);
    }
}
