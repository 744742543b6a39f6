//! Link Manager logic
//!
//! The manager is a single serialized task split into focused components:
//! - `state`: manager-owned state and statistics
//! - `handlers`: command and event handlers
//! - `task`: the `LinkManagerTask` select loop and channel plumbing
//!
//! Serializing everything through one task means no shared mutable state, no
//! locks, and deterministic ordering between user commands and provider
//! events. For one logical link the throughput of a single loop is never the
//! constraint; correctness of the interleavings is.

pub mod handlers;
pub mod state;
pub mod task;

pub use handlers::CommandHandlers;
pub use state::{ManagerState, ManagerStats};
pub use task::LinkManagerTask;
