//! Discovery candidate list
//!
//! Accumulates discovery results into a deduplicated, arrival-ordered set of
//! connect targets. The list lives for one discovery cycle: it is cleared when
//! a new cycle begins and replaced wholesale on the next `Discover` request.
//! While a connection attempt is in flight the list is left untouched; batches
//! arriving then are matched against the target instead (see the lifecycle
//! state machine).

use crate::types::{DeviceAddress, DiscoveredDevice};

// ----------------------------------------------------------------------------
// Candidate List
// ----------------------------------------------------------------------------

/// Arrival-ordered, address-unique list of discovered devices
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    devices: Vec<DiscoveredDevice>,
}

impl CandidateList {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Start a new discovery cycle, discarding previous candidates
    pub fn begin_cycle(&mut self) {
        self.devices.clear();
    }

    /// Append a device unless one with the same address is already listed
    ///
    /// Discovery can report the same device across batches within one cycle;
    /// duplicates are silently dropped. Returns whether the device was added.
    pub fn add_if_absent(&mut self, device: DiscoveredDevice) -> bool {
        if self.contains(device.address) {
            return false;
        }
        tracing::debug!(%device, "new discovery candidate");
        self.devices.push(device);
        true
    }

    /// Whether a device with this address is already listed
    pub fn contains(&self, address: DeviceAddress) -> bool {
        self.devices.iter().any(|d| d.address == address)
    }

    /// Read-only snapshot of the current candidates, in first-seen order
    pub fn snapshot(&self) -> Vec<DiscoveredDevice> {
        self.devices.clone()
    }

    /// Number of distinct candidates seen this cycle
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the current cycle has produced no candidates
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
