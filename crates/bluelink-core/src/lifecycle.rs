//! Connection lifecycle state machine
//!
//! Linear state machine for the single logical link: states must be consumed
//! to transition, which rules out invalid transitions at the type level. Each
//! transition yields the new state plus the effects the manager must issue to
//! the Link Provider, and a record for the transition audit trail.
//!
//! The machine is pure: it owns no channels and no timers. Retry timing is
//! requested through [`Effect::ScheduleRetry`], which the manager intercepts
//! and arms locally; candidate bookkeeping for batches seen while Discovering
//! also happens at the manager level.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::Effect;
use crate::errors::CapabilityIssue;
use crate::types::{DeviceAddress, DiscoveredDevice, Timestamp};

// ----------------------------------------------------------------------------
// Link Mode
// ----------------------------------------------------------------------------

/// Presentation-facing view of the lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkMode {
    Idle,
    Discovering,
    Connecting,
    Connected,
    AwaitingRetry,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkMode::Idle => write!(f, "Idle"),
            LinkMode::Discovering => write!(f, "Discovering"),
            LinkMode::Connecting => write!(f, "Connecting"),
            LinkMode::Connected => write!(f, "Connected"),
            LinkMode::AwaitingRetry => write!(f, "AwaitingRetry"),
        }
    }
}

// ----------------------------------------------------------------------------
// Link State Types
// ----------------------------------------------------------------------------

/// Linear lifecycle state that must be consumed to transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LinkState {
    /// No discovery, no connection
    Idle(IdleState),
    /// Listing candidates for the presentation layer
    Discovering(DiscoveringState),
    /// Attempting to reach the captured target address
    Connecting(ConnectingState),
    /// Link established
    Connected(ConnectedState),
    /// A one-shot reconnect timer is armed
    AwaitingRetry(AwaitingRetryState),
}

/// State when nothing is in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleState {
    pub since: Timestamp,
    /// Set when the capability was lost; cleared by the next explicit action
    pub capability_lost: Option<CapabilityIssue>,
}

/// State while a candidate-listing discovery cycle runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveringState {
    pub started_at: Timestamp,
    pub batches_seen: u32,
    pub devices_seen: u32,
}

/// State while attempting to locate and connect the target
///
/// The target address is captured here when the attempt starts and stays
/// immutable for the attempt's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectingState {
    pub target: DeviceAddress,
    pub started_at: Timestamp,
    /// The claimed device once a discovery batch matched the target
    pub in_flight: Option<DiscoveredDevice>,
}

/// State once the provider confirmed the connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedState {
    pub device: DiscoveredDevice,
    pub connected_since: Timestamp,
    /// A manual disconnect was issued; the confirming drop must not retry
    pub disconnect_requested: bool,
}

/// State while the reconnect timer counts down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwaitingRetryState {
    pub target: DeviceAddress,
    pub armed_at: Timestamp,
}

// ----------------------------------------------------------------------------
// Lifecycle Events
// ----------------------------------------------------------------------------

/// Inputs that drive lifecycle transitions
///
/// The manager maps user commands and Link Provider events onto these; the
/// provider's status-only callbacks (connecting, no-devices-found, data) never
/// reach the machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// User asked to connect to the selected address
    ConnectRequested { target: DeviceAddress },
    /// User asked to disconnect (or abandon the attempt)
    DisconnectRequested,
    /// User asked for a candidate-listing discovery cycle
    DiscoverRequested,
    /// Provider started a discovery pass
    DiscoveryStarted,
    /// Provider delivered a batch of discovered devices
    DevicesFound { devices: Vec<DiscoveredDevice> },
    /// Provider finished the discovery pass
    DiscoveryFinished,
    /// Provider confirmed the connection
    ConnectionEstablished { device: DiscoveredDevice },
    /// Provider reported the attempt failed
    ConnectionFailed { device: DiscoveredDevice },
    /// Provider reported the link dropped
    LinkDropped,
    /// The armed reconnect timer fired (generation already validated)
    RetryElapsed,
    /// Bluetooth is unsupported or disabled
    CapabilityLost { reason: CapabilityIssue },
}

impl LifecycleEvent {
    /// Short name for logging and audit records
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::ConnectRequested { .. } => "ConnectRequested",
            LifecycleEvent::DisconnectRequested => "DisconnectRequested",
            LifecycleEvent::DiscoverRequested => "DiscoverRequested",
            LifecycleEvent::DiscoveryStarted => "DiscoveryStarted",
            LifecycleEvent::DevicesFound { .. } => "DevicesFound",
            LifecycleEvent::DiscoveryFinished => "DiscoveryFinished",
            LifecycleEvent::ConnectionEstablished { .. } => "ConnectionEstablished",
            LifecycleEvent::ConnectionFailed { .. } => "ConnectionFailed",
            LifecycleEvent::LinkDropped => "LinkDropped",
            LifecycleEvent::RetryElapsed => "RetryElapsed",
            LifecycleEvent::CapabilityLost { .. } => "CapabilityLost",
        }
    }
}

// ----------------------------------------------------------------------------
// Transition Results
// ----------------------------------------------------------------------------

/// Result of a lifecycle transition
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// New lifecycle state
    pub new_state: LinkState,
    /// Effects the manager must issue
    pub effects: Vec<Effect>,
    /// Audit record for this transition
    pub record: TransitionRecord,
}

/// Audit record for a single transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub timestamp: Timestamp,
    pub from_state: &'static str,
    pub to_state: &'static str,
    pub event: &'static str,
    pub effects_count: usize,
}

/// Errors produced by invalid lifecycle transitions
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateTransitionError {
    #[error("event {event} not valid in state {from_state}")]
    InvalidTransition {
        from_state: &'static str,
        event: &'static str,
    },
}

// ----------------------------------------------------------------------------
// State Machine Implementation
// ----------------------------------------------------------------------------

impl LinkState {
    /// Initial state
    pub fn new() -> Self {
        LinkState::Idle(IdleState {
            since: Timestamp::now(),
            capability_lost: None,
        })
    }

    /// Current state name for logging/audit
    pub fn state_name(&self) -> &'static str {
        match self {
            LinkState::Idle(_) => "Idle",
            LinkState::Discovering(_) => "Discovering",
            LinkState::Connecting(_) => "Connecting",
            LinkState::Connected(_) => "Connected",
            LinkState::AwaitingRetry(_) => "AwaitingRetry",
        }
    }

    /// Presentation-facing mode
    pub fn mode(&self) -> LinkMode {
        match self {
            LinkState::Idle(_) => LinkMode::Idle,
            LinkState::Discovering(_) => LinkMode::Discovering,
            LinkState::Connecting(_) => LinkMode::Connecting,
            LinkState::Connected(_) => LinkMode::Connected,
            LinkState::AwaitingRetry(_) => LinkMode::AwaitingRetry,
        }
    }

    /// Whether command frames may be transmitted right now
    pub fn can_send_frames(&self) -> bool {
        matches!(self, LinkState::Connected(_))
    }

    /// The device currently connected, if any
    pub fn connected_device(&self) -> Option<&DiscoveredDevice> {
        match self {
            LinkState::Connected(s) => Some(&s.device),
            _ => None,
        }
    }

    /// Process an event and transition to a new state (consumes self)
    pub fn transition(
        self,
        event: LifecycleEvent,
    ) -> Result<StateTransition, StateTransitionError> {
        let from_state = self.state_name();
        let event_name = event.name();

        let (new_state, effects) = match (self, event) {
            // Explicit connect from any unconnected, non-attempting state.
            // The target is captured here and stays fixed for the attempt.
            (
                LinkState::Idle(_) | LinkState::Discovering(_) | LinkState::AwaitingRetry(_),
                LifecycleEvent::ConnectRequested { target },
            ) => (
                LinkState::Connecting(ConnectingState {
                    target,
                    started_at: Timestamp::now(),
                    in_flight: None,
                }),
                vec![Effect::TryConnection],
            ),

            // Re-entrant connect while attempting is an idempotent no-op
            (LinkState::Connecting(state), LifecycleEvent::ConnectRequested { .. }) => {
                (LinkState::Connecting(state), Vec::new())
            }

            // Explicit discovery restarts the cycle from anywhere unconnected,
            // abandoning a running attempt or a pending retry
            (
                LinkState::Idle(_)
                | LinkState::Discovering(_)
                | LinkState::Connecting(_)
                | LinkState::AwaitingRetry(_),
                LifecycleEvent::DiscoverRequested,
            ) => (
                LinkState::Discovering(DiscoveringState {
                    started_at: Timestamp::now(),
                    batches_seen: 0,
                    devices_seen: 0,
                }),
                vec![Effect::StartDiscovery],
            ),

            // While listing, batches accumulate; the manager feeds the
            // candidate list from the same event
            (LinkState::Discovering(mut state), LifecycleEvent::DevicesFound { devices }) => {
                state.batches_seen += 1;
                state.devices_seen += devices.len() as u32;
                (LinkState::Discovering(state), Vec::new())
            }

            (LinkState::Discovering(state), LifecycleEvent::DiscoveryStarted) => {
                (LinkState::Discovering(state), Vec::new())
            }

            // A listing cycle ends back in Idle
            (LinkState::Discovering(_), LifecycleEvent::DiscoveryFinished) => (
                LinkState::Idle(IdleState {
                    since: Timestamp::now(),
                    capability_lost: None,
                }),
                Vec::new(),
            ),

            // Attempting: scan each batch for the captured target. First
            // match wins and claims the device; the rest of the batch is not
            // scanned, so a later duplicate of the target is ignored.
            (LinkState::Connecting(mut state), LifecycleEvent::DevicesFound { devices }) => {
                if state.in_flight.is_none() {
                    if let Some(device) = devices.into_iter().find(|d| d.address == state.target) {
                        state.in_flight = Some(device.clone());
                        let effects = vec![Effect::ConnectTo { device }];
                        return Self::finish(
                            from_state,
                            event_name,
                            LinkState::Connecting(state),
                            effects,
                        );
                    }
                }
                (LinkState::Connecting(state), Vec::new())
            }

            (LinkState::Connecting(state), LifecycleEvent::DiscoveryStarted) => {
                (LinkState::Connecting(state), Vec::new())
            }

            // The locating pass ended without a claim: the target was not
            // found this cycle, so arm a retry. With a claim in flight the
            // attempt's outcome arrives as established/failed instead.
            (LinkState::Connecting(state), LifecycleEvent::DiscoveryFinished) => {
                if state.in_flight.is_some() {
                    (LinkState::Connecting(state), Vec::new())
                } else {
                    (
                        LinkState::AwaitingRetry(AwaitingRetryState {
                            target: state.target,
                            armed_at: Timestamp::now(),
                        }),
                        vec![Effect::ScheduleRetry],
                    )
                }
            }

            (
                LinkState::Connecting(_) | LinkState::AwaitingRetry(_),
                LifecycleEvent::ConnectionEstablished { device },
            ) => (
                LinkState::Connected(ConnectedState {
                    device,
                    connected_since: Timestamp::now(),
                    disconnect_requested: false,
                }),
                Vec::new(),
            ),

            (LinkState::Connecting(state), LifecycleEvent::ConnectionFailed { .. }) => (
                LinkState::AwaitingRetry(AwaitingRetryState {
                    target: state.target,
                    armed_at: Timestamp::now(),
                }),
                vec![Effect::ScheduleRetry],
            ),

            // A drop mid-attempt counts as a failed attempt
            (LinkState::Connecting(state), LifecycleEvent::LinkDropped) => (
                LinkState::AwaitingRetry(AwaitingRetryState {
                    target: state.target,
                    armed_at: Timestamp::now(),
                }),
                vec![Effect::ScheduleRetry],
            ),

            // Abandoning an attempt: nothing was connected yet, so no
            // disconnect is issued to the provider
            (LinkState::Connecting(_), LifecycleEvent::DisconnectRequested) => (
                LinkState::Idle(IdleState {
                    since: Timestamp::now(),
                    capability_lost: None,
                }),
                Vec::new(),
            ),

            // Manual disconnect while connected: issue the disconnect and
            // remember it so the confirming drop does not schedule a retry
            (LinkState::Connected(mut state), LifecycleEvent::DisconnectRequested) => {
                state.disconnect_requested = true;
                (LinkState::Connected(state), vec![Effect::Disconnect])
            }

            (LinkState::Connected(state), LifecycleEvent::LinkDropped) => {
                if state.disconnect_requested {
                    (
                        LinkState::Idle(IdleState {
                            since: Timestamp::now(),
                            capability_lost: None,
                        }),
                        Vec::new(),
                    )
                } else {
                    // Unsolicited drop: reconnect to the same device
                    (
                        LinkState::AwaitingRetry(AwaitingRetryState {
                            target: state.device.address,
                            armed_at: Timestamp::now(),
                        }),
                        vec![Effect::ScheduleRetry],
                    )
                }
            }

            (LinkState::AwaitingRetry(state), LifecycleEvent::RetryElapsed) => (
                LinkState::Connecting(ConnectingState {
                    target: state.target,
                    started_at: Timestamp::now(),
                    in_flight: None,
                }),
                vec![Effect::TryConnection],
            ),

            // Giving up on a pending retry returns to Idle
            (LinkState::AwaitingRetry(_), LifecycleEvent::DisconnectRequested) => (
                LinkState::Idle(IdleState {
                    since: Timestamp::now(),
                    capability_lost: None,
                }),
                Vec::new(),
            ),

            // The provider may flush the tail of a discovery cycle after an
            // attempt already failed; those stragglers are inert
            (
                LinkState::AwaitingRetry(state),
                LifecycleEvent::DiscoveryStarted
                | LifecycleEvent::DevicesFound { .. }
                | LifecycleEvent::DiscoveryFinished,
            ) => (LinkState::AwaitingRetry(state), Vec::new()),

            // Capability loss aborts everything; no automatic action follows
            // until an explicit user request arrives
            (_, LifecycleEvent::CapabilityLost { reason }) => (
                LinkState::Idle(IdleState {
                    since: Timestamp::now(),
                    capability_lost: Some(reason),
                }),
                Vec::new(),
            ),

            (_state, _event) => {
                return Err(StateTransitionError::InvalidTransition {
                    from_state,
                    event: event_name,
                });
            }
        };

        Self::finish(from_state, event_name, new_state, effects)
    }

    fn finish(
        from_state: &'static str,
        event: &'static str,
        new_state: LinkState,
        effects: Vec<Effect>,
    ) -> Result<StateTransition, StateTransitionError> {
        let record = TransitionRecord {
            timestamp: Timestamp::now(),
            from_state,
            to_state: new_state.state_name(),
            event,
            effects_count: effects.len(),
        };
        Ok(StateTransition {
            new_state,
            effects,
            record,
        })
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> DeviceAddress {
        s.parse().unwrap()
    }

    fn device(a: &str, name: &str) -> DiscoveredDevice {
        DiscoveredDevice::new(addr(a), name, false)
    }

    fn target() -> DeviceAddress {
        addr("98:D3:31:80:89:AF")
    }

    fn connecting() -> LinkState {
        LinkState::new()
            .transition(LifecycleEvent::ConnectRequested { target: target() })
            .unwrap()
            .new_state
    }

    fn connected() -> LinkState {
        let state = connecting()
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("98:D3:31:80:89:AF", "HC-05")],
            })
            .unwrap()
            .new_state;
        state
            .transition(LifecycleEvent::ConnectionEstablished {
                device: device("98:D3:31:80:89:AF", "HC-05"),
            })
            .unwrap()
            .new_state
    }

    #[test]
    fn test_initial_state() {
        let state = LinkState::new();
        assert_eq!(state.mode(), LinkMode::Idle);
        assert!(!state.can_send_frames());
        assert!(state.connected_device().is_none());
    }

    #[test]
    fn test_connect_captures_target_and_tries() {
        let transition = LinkState::new()
            .transition(LifecycleEvent::ConnectRequested { target: target() })
            .unwrap();

        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
        assert!(matches!(transition.effects[..], [Effect::TryConnection]));
        match transition.new_state {
            LinkState::Connecting(s) => {
                assert_eq!(s.target, target());
                assert!(s.in_flight.is_none());
            }
            _ => panic!("expected Connecting"),
        }
    }

    #[test]
    fn test_reentrant_connect_is_noop() {
        let state = connecting();
        let transition = state
            .transition(LifecycleEvent::ConnectRequested {
                target: addr("11:22:33:44:55:66"),
            })
            .unwrap();

        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
        assert!(transition.effects.is_empty());
        // The original target stays captured
        match transition.new_state {
            LinkState::Connecting(s) => assert_eq!(s.target, target()),
            _ => panic!("expected Connecting"),
        }
    }

    #[test]
    fn test_first_match_wins_in_batch() {
        let transition = connecting()
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![
                    device("11:22:33:44:55:66", "X"),
                    device("98:D3:31:80:89:AF", "Y"),
                    device("98:D3:31:80:89:AF", "Y-duplicate"),
                ],
            })
            .unwrap();

        assert_eq!(transition.effects.len(), 1);
        match &transition.effects[0] {
            Effect::ConnectTo { device } => assert_eq!(device.name, "Y"),
            other => panic!("expected ConnectTo, got {:?}", other),
        }
        match transition.new_state {
            LinkState::Connecting(s) => {
                assert_eq!(s.in_flight.as_ref().unwrap().name, "Y");
            }
            _ => panic!("expected Connecting"),
        }
    }

    #[test]
    fn test_later_batch_ignored_once_claimed() {
        let state = connecting()
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("98:D3:31:80:89:AF", "Y")],
            })
            .unwrap()
            .new_state;

        let transition = state
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("98:D3:31:80:89:AF", "Y")],
            })
            .unwrap();
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_non_matching_batch_produces_no_effects() {
        let transition = connecting()
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("11:22:33:44:55:66", "X")],
            })
            .unwrap();
        assert!(transition.effects.is_empty());
        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
    }

    #[test]
    fn test_discovery_finished_without_claim_arms_retry() {
        let transition = connecting()
            .transition(LifecycleEvent::DiscoveryFinished)
            .unwrap();

        assert_eq!(transition.new_state.mode(), LinkMode::AwaitingRetry);
        assert!(matches!(transition.effects[..], [Effect::ScheduleRetry]));
    }

    #[test]
    fn test_discovery_finished_with_claim_waits() {
        let state = connecting()
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("98:D3:31:80:89:AF", "Y")],
            })
            .unwrap()
            .new_state;

        let transition = state.transition(LifecycleEvent::DiscoveryFinished).unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_connection_failed_arms_retry() {
        let transition = connecting()
            .transition(LifecycleEvent::ConnectionFailed {
                device: device("98:D3:31:80:89:AF", "Y"),
            })
            .unwrap();

        assert_eq!(transition.new_state.mode(), LinkMode::AwaitingRetry);
        assert!(matches!(transition.effects[..], [Effect::ScheduleRetry]));
        match transition.new_state {
            LinkState::AwaitingRetry(s) => assert_eq!(s.target, target()),
            _ => panic!("expected AwaitingRetry"),
        }
    }

    #[test]
    fn test_established_connects() {
        let state = connected();
        assert_eq!(state.mode(), LinkMode::Connected);
        assert!(state.can_send_frames());
        assert_eq!(state.connected_device().unwrap().name, "HC-05");
    }

    #[test]
    fn test_unsolicited_drop_arms_retry_to_same_device() {
        let transition = connected().transition(LifecycleEvent::LinkDropped).unwrap();

        assert_eq!(transition.new_state.mode(), LinkMode::AwaitingRetry);
        assert!(matches!(transition.effects[..], [Effect::ScheduleRetry]));
        match transition.new_state {
            LinkState::AwaitingRetry(s) => assert_eq!(s.target, target()),
            _ => panic!("expected AwaitingRetry"),
        }
    }

    #[test]
    fn test_manual_disconnect_then_drop_goes_idle() {
        let transition = connected()
            .transition(LifecycleEvent::DisconnectRequested)
            .unwrap();
        assert!(matches!(transition.effects[..], [Effect::Disconnect]));
        assert_eq!(transition.new_state.mode(), LinkMode::Connected);

        let transition = transition
            .new_state
            .transition(LifecycleEvent::LinkDropped)
            .unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Idle);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_abandon_attempt_issues_no_disconnect() {
        let transition = connecting()
            .transition(LifecycleEvent::DisconnectRequested)
            .unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Idle);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn test_retry_elapsed_reconnects() {
        let state = connecting()
            .transition(LifecycleEvent::ConnectionFailed {
                device: device("98:D3:31:80:89:AF", "Y"),
            })
            .unwrap()
            .new_state;

        let transition = state.transition(LifecycleEvent::RetryElapsed).unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
        assert!(matches!(transition.effects[..], [Effect::TryConnection]));
    }

    #[test]
    fn test_explicit_action_preempts_pending_retry() {
        let awaiting = connecting()
            .transition(LifecycleEvent::ConnectionFailed {
                device: device("98:D3:31:80:89:AF", "Y"),
            })
            .unwrap()
            .new_state;

        let transition = awaiting
            .clone()
            .transition(LifecycleEvent::DiscoverRequested)
            .unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Discovering);
        assert!(matches!(transition.effects[..], [Effect::StartDiscovery]));

        let transition = awaiting
            .transition(LifecycleEvent::ConnectRequested { target: target() })
            .unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Connecting);
        assert!(matches!(transition.effects[..], [Effect::TryConnection]));
    }

    #[test]
    fn test_discovery_cycle_lists_and_returns_idle() {
        let state = LinkState::new()
            .transition(LifecycleEvent::DiscoverRequested)
            .unwrap()
            .new_state;
        assert_eq!(state.mode(), LinkMode::Discovering);

        let state = state
            .transition(LifecycleEvent::DevicesFound {
                devices: vec![device("11:22:33:44:55:66", "X")],
            })
            .unwrap()
            .new_state;

        let transition = state.transition(LifecycleEvent::DiscoveryFinished).unwrap();
        assert_eq!(transition.new_state.mode(), LinkMode::Idle);
    }

    #[test]
    fn test_capability_lost_aborts_everything() {
        for state in [connecting(), connected()] {
            let transition = state
                .transition(LifecycleEvent::CapabilityLost {
                    reason: CapabilityIssue::NotEnabled,
                })
                .unwrap();
            assert_eq!(transition.new_state.mode(), LinkMode::Idle);
            assert!(transition.effects.is_empty());
            match transition.new_state {
                LinkState::Idle(s) => {
                    assert_eq!(s.capability_lost, Some(CapabilityIssue::NotEnabled))
                }
                _ => panic!("expected Idle"),
            }
        }
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let result = LinkState::new().transition(LifecycleEvent::RetryElapsed);
        match result {
            Err(StateTransitionError::InvalidTransition { from_state, event }) => {
                assert_eq!(from_state, "Idle");
                assert_eq!(event, "RetryElapsed");
            }
            other => panic!("expected invalid transition, got {:?}", other),
        }
    }

    #[test]
    fn test_audit_record_fields() {
        let transition = LinkState::new()
            .transition(LifecycleEvent::ConnectRequested { target: target() })
            .unwrap();
        assert_eq!(transition.record.from_state, "Idle");
        assert_eq!(transition.record.to_state, "Connecting");
        assert_eq!(transition.record.event, "ConnectRequested");
        assert_eq!(transition.record.effects_count, 1);
    }
}
