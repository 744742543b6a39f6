//! Link Manager state
//!
//! Everything the serialized manager task owns: the lifecycle state machine,
//! the selected-target registry, candidate bookkeeping, the received text
//! buffer, the transition audit trail, and counters.

use bluelink_core::lifecycle::TransitionRecord;
use bluelink_core::{
    AddressRegistry, CandidateList, Effect, LifecycleEvent, LinkMode, LinkState,
    StateTransitionError, Timestamp,
};
use tracing::debug;

// ----------------------------------------------------------------------------
// Manager State
// ----------------------------------------------------------------------------

/// State owned by the Link Manager task
pub struct ManagerState {
    /// The lifecycle state machine for the single logical link
    pub lifecycle: LinkState,
    /// The address targeted by the next connect attempt
    pub registry: AddressRegistry,
    /// Devices collected during the current discovery cycle
    pub candidates: CandidateList,
    /// Accumulated text received over the link
    pub received: String,
    /// Audit trail for lifecycle transitions
    pub audit_trail: Vec<TransitionRecord>,
    /// Task start time
    pub start_time: Timestamp,
    /// Statistics
    pub stats: ManagerStats,
}

impl ManagerState {
    pub fn new() -> Self {
        Self {
            lifecycle: LinkState::new(),
            registry: AddressRegistry::new(),
            candidates: CandidateList::new(),
            received: String::new(),
            audit_trail: Vec::new(),
            start_time: Timestamp::now(),
            stats: ManagerStats::default(),
        }
    }

    /// Presentation-facing mode of the current lifecycle state
    pub fn mode(&self) -> LinkMode {
        self.lifecycle.mode()
    }

    /// Drive the lifecycle machine with an event
    ///
    /// On success the new state replaces the old one, the record joins the
    /// audit trail, and the effects are returned for the caller to issue. On
    /// an invalid transition the current state is untouched.
    pub fn apply(
        &mut self,
        event: LifecycleEvent,
    ) -> Result<Vec<Effect>, StateTransitionError> {
        let transition = self.lifecycle.clone().transition(event)?;
        debug!(
            from = transition.record.from_state,
            to = transition.record.to_state,
            event = transition.record.event,
            "lifecycle transition"
        );
        self.lifecycle = transition.new_state;
        self.audit_trail.push(transition.record);
        self.stats.state_transitions += 1;
        Ok(transition.effects)
    }

    /// Append a received data byte to the terminal text
    pub fn record_received_byte(&mut self, byte: u8) -> &str {
        if !self.received.is_empty() {
            self.received.push_str(", ");
        }
        self.received.push_str(&byte.to_string());
        self.stats.bytes_received += 1;
        &self.received
    }
}

impl Default for ManagerState {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

/// Statistics for the Link Manager task
#[derive(Debug, Clone, Default)]
pub struct ManagerStats {
    pub commands_processed: u64,
    pub events_processed: u64,
    pub effects_issued: u64,
    pub app_events_emitted: u64,
    pub state_transitions: u64,
    pub frames_sent: u64,
    pub bytes_received: u64,
    pub retries_scheduled: u64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bluelink_core::DeviceAddress;

    #[test]
    fn test_apply_advances_state_and_audit() {
        let mut state = ManagerState::new();
        let target: DeviceAddress = "98:D3:31:80:89:AF".parse().unwrap();

        let effects = state
            .apply(LifecycleEvent::ConnectRequested { target })
            .unwrap();

        assert_eq!(state.mode(), LinkMode::Connecting);
        assert_eq!(effects.len(), 1);
        assert_eq!(state.audit_trail.len(), 1);
        assert_eq!(state.stats.state_transitions, 1);
    }

    #[test]
    fn test_invalid_event_leaves_state_untouched() {
        let mut state = ManagerState::new();
        let result = state.apply(LifecycleEvent::RetryElapsed);

        assert!(result.is_err());
        assert_eq!(state.mode(), LinkMode::Idle);
        assert!(state.audit_trail.is_empty());
    }

    #[test]
    fn test_received_bytes_accumulate_as_text() {
        let mut state = ManagerState::new();
        assert_eq!(state.record_received_byte(65), "65");
        assert_eq!(state.record_received_byte(10), "65, 10");
        assert_eq!(state.stats.bytes_received, 2);
    }
}
