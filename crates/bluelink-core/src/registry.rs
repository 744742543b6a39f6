//! Target address registry
//!
//! Holds the single address the next connection attempt will aim at, and
//! extracts addresses from formatted candidate listings. Display entries are
//! contractually suffixed with the raw address, so extraction takes the
//! fixed-length trailing substring.

use crate::types::{DeviceAddress, ADDRESS_DISPLAY_LEN};
use crate::{LinkError, LinkResult};

// ----------------------------------------------------------------------------
// Address Registry
// ----------------------------------------------------------------------------

/// Stores the currently selected target address
///
/// Exactly one address is selected at a time; `set_selected` overwrites, it
/// never queues.
#[derive(Debug, Clone)]
pub struct AddressRegistry {
    selected: Option<DeviceAddress>,
}

impl AddressRegistry {
    /// Create an empty registry with no selection
    pub fn new() -> Self {
        Self { selected: None }
    }

    /// Create a registry with an initial selection
    pub fn with_selected(address: DeviceAddress) -> Self {
        Self {
            selected: Some(address),
        }
    }

    /// Record the address to target on the next connect attempt
    pub fn set_selected(&mut self, address: DeviceAddress) {
        self.selected = Some(address);
    }

    /// The currently selected address, if any
    pub fn selected(&self) -> Option<DeviceAddress> {
        self.selected
    }

    /// Parse an address out of a formatted display listing
    ///
    /// Listings always end with the raw colon-separated address; everything
    /// before it (name, paired marker) is presentation text.
    pub fn extract_from_listing(listing: &str, address_len: usize) -> LinkResult<DeviceAddress> {
        // chars rather than byte slicing: the name portion may hold
        // multi-byte characters even though the address suffix is ASCII.
        let chars: Vec<char> = listing.chars().collect();
        if chars.len() < address_len {
            return Err(LinkError::MalformedListing {
                listing: listing.to_string(),
                expected_len: address_len,
            });
        }
        let tail: String = chars[chars.len() - address_len..].iter().collect();
        tail.parse()
    }
}

impl Default for AddressRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
