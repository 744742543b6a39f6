//! Link Manager command and event handlers
//!
//! Each handler maps one inbound message onto lifecycle events, registry and
//! candidate updates, and returns the effects to issue plus the app events to
//! emit. Handlers never touch channels; the task loop owns those.
//!
//! Inbound messages that are merely stale (a failure report after the user
//! abandoned the attempt, a discovery straggler after the cycle moved on) are
//! logged and dropped rather than surfaced as errors.

use bluelink_core::{
    AddressRegistry, AppEvent, CapabilityIssue, CommandFrame, DeviceAddress, DiscoveredDevice,
    Effect, LifecycleEvent, LinkMode, LinkResult, LinkStatus,
};
use tracing::{debug, warn};

use super::state::ManagerState;

/// Command and event handlers for the Link Manager task
pub struct CommandHandlers;

type Outcome = LinkResult<(Vec<Effect>, Vec<AppEvent>)>;

impl CommandHandlers {
    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Handle the connect toggle: disconnect when connected, otherwise start
    /// an attempt against the selected address
    pub fn handle_connect(state: &mut ManagerState) -> Outcome {
        if state.mode() == LinkMode::Connected {
            let effects = state.apply(LifecycleEvent::DisconnectRequested)?;
            return Ok((effects, Vec::new()));
        }

        let Some(target) = state.registry.selected() else {
            return Ok((
                Vec::new(),
                vec![AppEvent::SystemError {
                    error: "no target address selected".to_string(),
                }],
            ));
        };

        match state.apply(LifecycleEvent::ConnectRequested { target }) {
            Ok(effects) => Ok((effects, Vec::new())),
            Err(e) => {
                debug!("connect request dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle an explicit disconnect: tears down the link, abandons a running
    /// attempt, or gives up on a pending retry
    pub fn handle_disconnect(state: &mut ManagerState) -> Outcome {
        match state.apply(LifecycleEvent::DisconnectRequested) {
            Ok(effects) => Ok((effects, Vec::new())),
            Err(e) => {
                debug!("disconnect request dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle a discovery request: clears the candidate list and starts a
    /// fresh listing cycle
    pub fn handle_discover(state: &mut ManagerState) -> Outcome {
        match state.apply(LifecycleEvent::DiscoverRequested) {
            Ok(effects) => {
                state.candidates.begin_cycle();
                let app_events = vec![AppEvent::CandidatesUpdated {
                    devices: state.candidates.snapshot(),
                }];
                Ok((effects, app_events))
            }
            Err(e) => Ok((
                Vec::new(),
                vec![AppEvent::SystemError {
                    error: format!("cannot discover now: {}", e),
                }],
            )),
        }
    }

    /// Handle selecting the target address directly
    pub fn handle_select_address(state: &mut ManagerState, address: DeviceAddress) -> Outcome {
        state.registry.set_selected(address);
        Ok((Vec::new(), vec![AppEvent::TargetChanged { address }]))
    }

    /// Handle selecting the target by candidate listing; the address is the
    /// listing's trailing characters
    pub fn handle_select_listing(
        state: &mut ManagerState,
        listing: String,
        address_len: usize,
    ) -> Outcome {
        match AddressRegistry::extract_from_listing(&listing, address_len) {
            Ok(address) => {
                state.registry.set_selected(address);
                Ok((Vec::new(), vec![AppEvent::TargetChanged { address }]))
            }
            Err(e) => {
                warn!("rejected listing selection: {}", e);
                Ok((
                    Vec::new(),
                    vec![AppEvent::SystemError {
                        error: e.to_string(),
                    }],
                ))
            }
        }
    }

    /// Handle a frame-send request; refused outside Connected without
    /// touching the provider
    pub fn handle_send_frame(state: &mut ManagerState, frame: CommandFrame) -> Outcome {
        if !state.lifecycle.can_send_frames() {
            warn!("dropping frame send while not connected");
            return Ok((
                Vec::new(),
                vec![AppEvent::SystemError {
                    error: "not connected".to_string(),
                }],
            ));
        }

        state.stats.frames_sent += 1;
        let device = state.lifecycle.connected_device().cloned();
        Ok((
            vec![Effect::SendFrame { frame }],
            vec![AppEvent::StatusChanged {
                status: LinkStatus::FrameSent,
                device,
            }],
        ))
    }

    /// Handle a validated reconnect timer fire
    pub fn handle_retry_elapsed(state: &mut ManagerState) -> Outcome {
        match state.apply(LifecycleEvent::RetryElapsed) {
            Ok(effects) => Ok((effects, Vec::new())),
            Err(e) => {
                warn!("retry fire dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Provider events
    // ------------------------------------------------------------------------

    /// Handle a capability loss report from the provider
    pub fn handle_capability_lost(state: &mut ManagerState, reason: CapabilityIssue) -> Outcome {
        let effects = state.apply(LifecycleEvent::CapabilityLost { reason })?;
        let status = match reason {
            CapabilityIssue::NotSupported => LinkStatus::NotSupported,
            CapabilityIssue::NotEnabled => LinkStatus::NotEnabled,
        };
        Ok((
            effects,
            vec![AppEvent::StatusChanged {
                status,
                device: None,
            }],
        ))
    }

    /// Handle the provider starting an attempt against a claimed device
    pub fn handle_connecting(_state: &mut ManagerState, device: DiscoveredDevice) -> Outcome {
        Ok((
            Vec::new(),
            vec![AppEvent::StatusChanged {
                status: LinkStatus::Connecting,
                device: Some(device),
            }],
        ))
    }

    /// Handle a confirmed connection
    pub fn handle_connected(state: &mut ManagerState, device: DiscoveredDevice) -> Outcome {
        match state.apply(LifecycleEvent::ConnectionEstablished {
            device: device.clone(),
        }) {
            Ok(effects) => Ok((
                effects,
                vec![AppEvent::StatusChanged {
                    status: LinkStatus::Connected,
                    device: Some(device),
                }],
            )),
            Err(e) => {
                warn!("unexpected connection report dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle the link dropping; whether a retry follows depends on whether
    /// the disconnect was requested
    pub fn handle_disconnected(state: &mut ManagerState) -> Outcome {
        let device = state.lifecycle.connected_device().cloned();
        match state.apply(LifecycleEvent::LinkDropped) {
            Ok(effects) => {
                let status = if state.mode() == LinkMode::AwaitingRetry {
                    LinkStatus::Reconnecting
                } else {
                    LinkStatus::Disconnected
                };
                Ok((
                    effects,
                    vec![AppEvent::StatusChanged { status, device }],
                ))
            }
            Err(e) => {
                debug!("disconnect report dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle a failed connection attempt
    pub fn handle_connection_failed(
        state: &mut ManagerState,
        device: DiscoveredDevice,
    ) -> Outcome {
        match state.apply(LifecycleEvent::ConnectionFailed {
            device: device.clone(),
        }) {
            Ok(effects) => Ok((
                effects,
                vec![AppEvent::StatusChanged {
                    status: LinkStatus::Reconnecting,
                    device: Some(device),
                }],
            )),
            Err(e) => {
                debug!("failure report dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle the provider starting a discovery pass
    pub fn handle_discovery_started(state: &mut ManagerState) -> Outcome {
        match state.apply(LifecycleEvent::DiscoveryStarted) {
            Ok(effects) => Ok((
                effects,
                vec![AppEvent::StatusChanged {
                    status: LinkStatus::DiscoveryStarted,
                    device: None,
                }],
            )),
            Err(e) => {
                debug!("discovery start dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle the end of a discovery pass
    ///
    /// While listing this closes the cycle; while locating a target that was
    /// never found it arms the reconnect timer instead.
    pub fn handle_discovery_finished(state: &mut ManagerState) -> Outcome {
        let was_listing = state.mode() == LinkMode::Discovering;
        match state.apply(LifecycleEvent::DiscoveryFinished) {
            Ok(effects) => {
                let mut app_events = Vec::new();
                if was_listing {
                    app_events.push(AppEvent::StatusChanged {
                        status: LinkStatus::DiscoveryFinished,
                        device: None,
                    });
                } else if effects.iter().any(|e| matches!(e, Effect::ScheduleRetry)) {
                    app_events.push(AppEvent::StatusChanged {
                        status: LinkStatus::Reconnecting,
                        device: None,
                    });
                }
                Ok((effects, app_events))
            }
            Err(e) => {
                debug!("discovery finish dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle a no-devices-found report; presentation only
    pub fn handle_no_devices_found(_state: &mut ManagerState) -> Outcome {
        Ok((
            Vec::new(),
            vec![AppEvent::StatusChanged {
                status: LinkStatus::NoDevicesFound,
                device: None,
            }],
        ))
    }

    /// Handle a batch of discovered devices
    ///
    /// While listing the batch feeds the candidate list; while locating a
    /// target the machine may claim a match and answer with
    /// [`Effect::ConnectTo`]. The candidate list is never touched mid-attempt.
    pub fn handle_devices_found(
        state: &mut ManagerState,
        devices: Vec<DiscoveredDevice>,
    ) -> Outcome {
        let was_listing = state.mode() == LinkMode::Discovering;
        match state.apply(LifecycleEvent::DevicesFound {
            devices: devices.clone(),
        }) {
            Ok(effects) => {
                let mut app_events = Vec::new();
                if was_listing {
                    let mut changed = false;
                    for device in devices {
                        changed |= state.candidates.add_if_absent(device);
                    }
                    if changed {
                        app_events.push(AppEvent::CandidatesUpdated {
                            devices: state.candidates.snapshot(),
                        });
                    }
                }
                Ok((effects, app_events))
            }
            Err(e) => {
                debug!("device batch dropped: {}", e);
                Ok((Vec::new(), Vec::new()))
            }
        }
    }

    /// Handle a received data byte; only meaningful while connected
    pub fn handle_data_received(state: &mut ManagerState, byte: u8) -> Outcome {
        if !state.lifecycle.can_send_frames() {
            warn!(byte, "dropping data received while not connected");
            return Ok((Vec::new(), Vec::new()));
        }

        let text = state.record_received_byte(byte).to_string();
        Ok((Vec::new(), vec![AppEvent::DataReceived { byte, text }]))
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

    fn connecting_state() -> ManagerState {
        let mut state = ManagerState::new();
        state.registry.set_selected(addr("98:D3:31:80:89:AF"));
        let (effects, _) = CommandHandlers::handle_connect(&mut state).unwrap();
        assert!(matches!(effects[..], [Effect::TryConnection]));
        state
    }

    fn connected_state() -> ManagerState {
        let mut state = connecting_state();
        CommandHandlers::handle_connected(&mut state, device("98:D3:31:80:89:AF", "HC-05"))
            .unwrap();
        assert_eq!(state.mode(), LinkMode::Connected);
        state
    }

    #[test]
    fn test_connect_without_target_reports_error() {
        let mut state = ManagerState::new();
        let (effects, app_events) = CommandHandlers::handle_connect(&mut state).unwrap();

        assert!(effects.is_empty());
        assert!(matches!(app_events[..], [AppEvent::SystemError { .. }]));
        assert_eq!(state.mode(), LinkMode::Idle);
    }

    #[test]
    fn test_connect_toggles_to_disconnect_when_connected() {
        let mut state = connected_state();
        let (effects, _) = CommandHandlers::handle_connect(&mut state).unwrap();
        assert!(matches!(effects[..], [Effect::Disconnect]));
    }

    #[test]
    fn test_repeated_connect_issues_one_attempt() {
        let mut state = connecting_state();
        let (effects, app_events) = CommandHandlers::handle_connect(&mut state).unwrap();
        assert!(effects.is_empty());
        assert!(app_events.is_empty());
    }

    #[test]
    fn test_send_frame_refused_when_not_connected() {
        let mut state = ManagerState::new();
        let (effects, app_events) =
            CommandHandlers::handle_send_frame(&mut state, CommandFrame::from_text("#10c12n\r"))
                .unwrap();

        assert!(effects.is_empty());
        assert!(matches!(app_events[..], [AppEvent::SystemError { .. }]));
        assert_eq!(state.stats.frames_sent, 0);
    }

    #[test]
    fn test_send_frame_forwarded_when_connected() {
        let mut state = connected_state();
        let (effects, app_events) =
            CommandHandlers::handle_send_frame(&mut state, CommandFrame::from_text("#10c13n\r"))
                .unwrap();

        assert!(matches!(effects[..], [Effect::SendFrame { .. }]));
        assert!(matches!(
            app_events[..],
            [AppEvent::StatusChanged {
                status: LinkStatus::FrameSent,
                ..
            }]
        ));
        assert_eq!(state.stats.frames_sent, 1);
    }

    #[test]
    fn test_select_listing_sets_target() {
        let mut state = ManagerState::new();
        let (_, app_events) = CommandHandlers::handle_select_listing(
            &mut state,
            "HC-05\n98:D3:31:80:89:AF".to_string(),
            17,
        )
        .unwrap();

        assert_eq!(state.registry.selected(), Some(addr("98:D3:31:80:89:AF")));
        assert!(matches!(app_events[..], [AppEvent::TargetChanged { .. }]));
    }

    #[test]
    fn test_select_malformed_listing_reports_error() {
        let mut state = ManagerState::new();
        let (_, app_events) =
            CommandHandlers::handle_select_listing(&mut state, "short".to_string(), 17).unwrap();

        assert!(state.registry.selected().is_none());
        assert!(matches!(app_events[..], [AppEvent::SystemError { .. }]));
    }

    #[test]
    fn test_batches_feed_candidates_only_while_listing() {
        let mut state = ManagerState::new();
        CommandHandlers::handle_discover(&mut state).unwrap();
        CommandHandlers::handle_discovery_started(&mut state).unwrap();

        let (_, app_events) = CommandHandlers::handle_devices_found(
            &mut state,
            vec![
                device("11:22:33:44:55:66", "X"),
                device("11:22:33:44:55:66", "X-again"),
            ],
        )
        .unwrap();
        assert_eq!(state.candidates.len(), 1);
        assert!(matches!(app_events[..], [AppEvent::CandidatesUpdated { .. }]));

        // While locating, the same batch never reaches the candidate list
        let mut state = connecting_state();
        let (effects, app_events) = CommandHandlers::handle_devices_found(
            &mut state,
            vec![device("98:D3:31:80:89:AF", "Y")],
        )
        .unwrap();
        assert!(state.candidates.is_empty());
        assert!(app_events.is_empty());
        assert!(matches!(effects[..], [Effect::ConnectTo { .. }]));
    }

    #[test]
    fn test_duplicate_only_batch_emits_no_update() {
        let mut state = ManagerState::new();
        CommandHandlers::handle_discover(&mut state).unwrap();
        CommandHandlers::handle_devices_found(&mut state, vec![device("11:22:33:44:55:66", "X")])
            .unwrap();

        let (_, app_events) = CommandHandlers::handle_devices_found(
            &mut state,
            vec![device("11:22:33:44:55:66", "X")],
        )
        .unwrap();
        assert!(app_events.is_empty());
    }

    #[test]
    fn test_unsolicited_drop_reports_reconnecting() {
        let mut state = connected_state();
        let (effects, app_events) = CommandHandlers::handle_disconnected(&mut state).unwrap();

        assert!(matches!(effects[..], [Effect::ScheduleRetry]));
        assert!(matches!(
            app_events[..],
            [AppEvent::StatusChanged {
                status: LinkStatus::Reconnecting,
                ..
            }]
        ));
        assert_eq!(state.mode(), LinkMode::AwaitingRetry);
    }

    #[test]
    fn test_requested_drop_reports_disconnected() {
        let mut state = connected_state();
        CommandHandlers::handle_connect(&mut state).unwrap();
        let (effects, app_events) = CommandHandlers::handle_disconnected(&mut state).unwrap();

        assert!(effects.is_empty());
        assert!(matches!(
            app_events[..],
            [AppEvent::StatusChanged {
                status: LinkStatus::Disconnected,
                ..
            }]
        ));
        assert_eq!(state.mode(), LinkMode::Idle);
    }

    #[test]
    fn test_data_received_only_while_connected() {
        let mut state = ManagerState::new();
        let (_, app_events) = CommandHandlers::handle_data_received(&mut state, 65).unwrap();
        assert!(app_events.is_empty());

        let mut state = connected_state();
        let (_, app_events) = CommandHandlers::handle_data_received(&mut state, 65).unwrap();
        match &app_events[..] {
            [AppEvent::DataReceived { byte: 65, text }] => assert_eq!(text, "65"),
            other => panic!("expected DataReceived, got {:?}", other),
        }
    }

    #[test]
    fn test_capability_lost_goes_idle_with_status() {
        let mut state = connected_state();
        let (_, app_events) =
            CommandHandlers::handle_capability_lost(&mut state, CapabilityIssue::NotEnabled)
                .unwrap();

        assert_eq!(state.mode(), LinkMode::Idle);
        assert!(matches!(
            app_events[..],
            [AppEvent::StatusChanged {
                status: LinkStatus::NotEnabled,
                ..
            }]
        ));
    }
}
