//! bluelink core
//!
//! Foundational types and the connection lifecycle state machine for a single
//! logical link to a remote serial-over-Bluetooth device: target address
//! handling, discovery candidate bookkeeping, the channel communication
//! protocol, and the pure state machine that decides when to scan, connect,
//! retry, and give up. The serialized manager loop that drives it lives in
//! `bluelink-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod candidates;
pub mod channel;
pub mod config;
pub mod errors;
pub mod frame;
pub mod lifecycle;
pub mod provider;
pub mod registry;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use candidates::CandidateList;
pub use channel::{AppEvent, Command, Effect, LinkEvent, LinkStatus};
pub use config::{ChannelConfig, LinkConfig};
pub use errors::{CapabilityIssue, LinkError, LinkResult};
pub use frame::CommandFrame;
pub use lifecycle::{LifecycleEvent, LinkMode, LinkState, StateTransition, StateTransitionError};
pub use provider::LinkProviderTask;
pub use registry::AddressRegistry;
pub use types::{DeviceAddress, DiscoveredDevice, SystemTimeSource, TimeSource, Timestamp};
