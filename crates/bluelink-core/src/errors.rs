//! Error types for the bluelink connection manager
//!
//! Transient link errors (connection failures, unsolicited drops) are absorbed
//! by the lifecycle state machine and only surfaced to the presentation layer
//! as status; errors in this module are the caller-facing and internal kinds.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::lifecycle::StateTransitionError;

// ----------------------------------------------------------------------------
// Capability Issues
// ----------------------------------------------------------------------------

/// Why the Bluetooth capability is unavailable
///
/// Reported, never retried: remediation is external (hardware, OS settings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// The host has no Bluetooth support at all
    NotSupported,
    /// Bluetooth exists but is switched off
    NotEnabled,
}

impl fmt::Display for CapabilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityIssue::NotSupported => write!(f, "bluetooth not supported"),
            CapabilityIssue::NotEnabled => write!(f, "bluetooth not enabled"),
        }
    }
}

// ----------------------------------------------------------------------------
// Link Error
// ----------------------------------------------------------------------------

/// Unified error type for the bluelink crates
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("bluetooth capability unavailable: {reason}")]
    CapabilityUnavailable { reason: CapabilityIssue },

    #[error("connection to {device} failed")]
    ConnectionFailed { device: String },

    #[error("link dropped unexpectedly")]
    LinkLost,

    #[error("not connected")]
    NotConnected,

    #[error("listing {listing:?} too short to carry a {expected_len}-character address")]
    MalformedListing {
        listing: String,
        expected_len: usize,
    },

    #[error("invalid device address: {value:?}")]
    InvalidAddress { value: String },

    #[error("no target address selected")]
    NoAddressSelected,

    #[error("{channel} channel closed")]
    ChannelClosed { channel: &'static str },

    #[error("{channel} channel full")]
    ChannelBusy { channel: &'static str },

    #[error(transparent)]
    Transition(#[from] StateTransitionError),
}

pub type LinkResult<T> = Result<T, LinkError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
