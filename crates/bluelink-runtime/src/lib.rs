//! bluelink runtime
//!
//! The engine driving the connection lifecycle defined in `bluelink-core`:
//! - [`LinkManagerTask`]: the single serialized task owning all state
//! - [`RetryScheduler`]: the generation-tokened reconnect timer
//! - [`LinkManagerBuilder`] / [`LinkHandle`]: wiring and the caller-facing API
//!
//! The Link Provider (the code that actually drives the radio) plugs in
//! through the [`LinkProviderTask`](bluelink_core::LinkProviderTask) trait and
//! talks to the manager over channels only.

pub mod builder;
pub mod logic;
pub mod retry;

pub use builder::{LinkHandle, LinkManagerBuilder, ProviderEndpoints};
pub use logic::{LinkManagerTask, ManagerStats};
pub use retry::RetryScheduler;

// Re-export core types for convenience
pub use bluelink_core::{
    channel::{
        AppEventReceiver, AppEventSender, ChannelError, CommandReceiver, CommandSender,
        EffectReceiver, EffectSender, EventReceiver, EventSender, NonBlockingSend,
    },
    AppEvent, CapabilityIssue, ChannelConfig, Command, CommandFrame, DeviceAddress,
    DiscoveredDevice, Effect, LinkConfig, LinkError, LinkEvent, LinkMode, LinkProviderTask,
    LinkResult, LinkStatus,
};
