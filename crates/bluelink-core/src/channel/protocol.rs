//! Channel message types
//!
//! Four directed message enums connect the three parties:
//!
//! - [`Command`]: presentation → manager (user intents, plus the retry
//!   scheduler's re-entry path)
//! - [`LinkEvent`]: Link Provider → manager
//! - [`Effect`]: manager → Link Provider
//! - [`AppEvent`]: manager → presentation (immutable snapshots only, never a
//!   live reference)

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::CommandFrame;
use crate::types::{DeviceAddress, DiscoveredDevice};

// ----------------------------------------------------------------------------
// Command: Presentation/External → Manager
// ----------------------------------------------------------------------------

/// Commands sent to the Link Manager task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Connect to the selected address, or disconnect when already connected
    /// (toggle semantics)
    Connect,
    /// Disconnect, or abandon an in-progress attempt
    Disconnect,
    /// Start a candidate-listing discovery cycle
    Discover,
    /// Select the address targeted by the next connect attempt
    SelectAddress { address: DeviceAddress },
    /// Select the target by tapping a formatted candidate listing; the
    /// address is extracted from the listing's trailing characters
    SelectListing { listing: String },
    /// Transmit a command frame over the established link
    SendFrame { frame: CommandFrame },
    /// Internal: the reconnect timer fired. Stale generations are dropped.
    RetryElapsed { generation: u64 },
    /// Shut down the manager and stop the Link Provider
    Shutdown,
}

// ----------------------------------------------------------------------------
// LinkEvent: Link Provider → Manager
// ----------------------------------------------------------------------------

/// Events delivered by the Link Provider
///
/// The provider's callback interface re-expressed as a tagged enum consumed
/// by the single serialized manager loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LinkEvent {
    /// The host has no Bluetooth support
    NotSupported,
    /// Bluetooth is switched off
    NotEnabled,
    /// The provider started connecting to a device
    Connecting { device: DiscoveredDevice },
    /// The connection is established
    Connected { device: DiscoveredDevice },
    /// The link dropped (solicited or not; the manager knows which)
    Disconnected,
    /// The connection attempt failed
    ConnectionFailed { device: DiscoveredDevice },
    /// A discovery pass started
    DiscoveryStarted,
    /// The discovery pass finished
    DiscoveryFinished,
    /// The discovery pass found nothing at all
    NoDevicesFound,
    /// A batch of discovered devices; the manager answers a match with
    /// [`Effect::ConnectTo`]
    DevicesFound { devices: Vec<DiscoveredDevice> },
    /// A data byte arrived over the link
    DataReceived { byte: u8 },
}

// ----------------------------------------------------------------------------
// Effect: Manager → Link Provider
// ----------------------------------------------------------------------------

/// Commands issued to the Link Provider
///
/// `ScheduleRetry` is the one effect handled locally by the manager (it arms
/// the retry scheduler) and is never forwarded to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    /// Connect to the last device, or discover-and-match when there is none
    TryConnection,
    /// Claim a specific device from a discovery batch for connection
    ConnectTo { device: DiscoveredDevice },
    /// Tear down the established link
    Disconnect,
    /// Run a candidate-listing discovery pass
    StartDiscovery,
    /// Transmit a frame over the established link
    SendFrame { frame: CommandFrame },
    /// Arm the one-shot reconnect timer (handled locally by the manager)
    ScheduleRetry,
    /// Stop the provider; no events may follow
    Stop,
}

// ----------------------------------------------------------------------------
// AppEvent: Manager → Presentation
// ----------------------------------------------------------------------------

/// State-change notifications for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// The lifecycle mode changed
    ModeChanged { mode: crate::lifecycle::LinkMode },
    /// A status line worth showing, with the device involved when known
    StatusChanged {
        status: LinkStatus,
        device: Option<DiscoveredDevice>,
    },
    /// The candidate list changed; a detached snapshot in first-seen order
    CandidatesUpdated { devices: Vec<DiscoveredDevice> },
    /// A new target address was selected for the next connect attempt
    TargetChanged { address: DeviceAddress },
    /// A data byte arrived; `text` is the accumulated terminal text
    DataReceived { byte: u8, text: String },
    /// A request could not be honored
    SystemError { error: String },
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Status line vocabulary for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    NotSupported,
    NotEnabled,
    Connecting,
    Connected,
    Disconnected,
    /// Dropped or failed; a reconnect attempt is scheduled
    Reconnecting,
    DiscoveryStarted,
    DiscoveryFinished,
    NoDevicesFound,
    FrameSent,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::NotSupported => write!(f, "bluetooth not supported"),
            LinkStatus::NotEnabled => write!(f, "bluetooth not enabled"),
            LinkStatus::Connecting => write!(f, "connecting"),
            LinkStatus::Connected => write!(f, "connected"),
            LinkStatus::Disconnected => write!(f, "disconnected"),
            LinkStatus::Reconnecting => write!(f, "reconnecting"),
            LinkStatus::DiscoveryStarted => write!(f, "discovery started"),
            LinkStatus::DiscoveryFinished => write!(f, "discovery finished"),
            LinkStatus::NoDevicesFound => write!(f, "no devices found"),
            LinkStatus::FrameSent => write!(f, "frame sent"),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(LinkStatus::Reconnecting.to_string(), "reconnecting");
        assert_eq!(LinkStatus::NoDevicesFound.to_string(), "no devices found");
    }

    #[test]
    fn test_command_serialization() {
        let cmd = Command::SendFrame {
            frame: CommandFrame::from_text("#10c12n\r"),
        };

        let serialized = bincode::serialize(&cmd).unwrap();
        let deserialized: Command = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Command::SendFrame { frame } => assert_eq!(frame.as_bytes(), b"#10c12n\r"),
            _ => panic!("wrong command type"),
        }
    }

    #[test]
    fn test_event_serialization() {
        let address: DeviceAddress = "98:D3:31:80:89:AF".parse().unwrap();
        let event = LinkEvent::DevicesFound {
            devices: vec![DiscoveredDevice::new(address, "HC-05", true)],
        };

        let serialized = bincode::serialize(&event).unwrap();
        let deserialized: LinkEvent = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            LinkEvent::DevicesFound { devices } => {
                assert_eq!(devices.len(), 1);
                assert_eq!(devices[0].address, address);
                assert!(devices[0].paired);
            }
            _ => panic!("wrong event type"),
        }
    }
}
