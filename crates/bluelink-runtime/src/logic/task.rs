//! Link Manager task
//!
//! The single serialized loop that owns all manager state. Commands from the
//! presentation layer and events from the Link Provider are multiplexed with
//! `tokio::select!` and processed one at a time, so no state is ever shared
//! or locked.

use bluelink_core::channel::{
    AppEventSender, CommandReceiver, EffectSender, EventReceiver,
};
use bluelink_core::{
    AppEvent, CapabilityIssue, Command, Effect, LinkConfig, LinkError, LinkEvent, LinkMode,
    LinkResult,
};
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::handlers::CommandHandlers;
use super::state::{ManagerState, ManagerStats};
use crate::retry::RetryScheduler;

// ----------------------------------------------------------------------------
// Link Manager Task
// ----------------------------------------------------------------------------

/// The Link Manager task that processes all commands and events
pub struct LinkManagerTask {
    /// Manager state (lifecycle machine, registry, candidates, buffers)
    state: ManagerState,
    /// Configuration
    config: LinkConfig,
    /// Reconnect timer
    retry: RetryScheduler,
    /// Channel for receiving commands from the handle (and the retry timer)
    command_receiver: CommandReceiver,
    /// Channel for receiving events from the Link Provider
    event_receiver: EventReceiver,
    /// Channel for sending effects to the Link Provider
    effect_sender: EffectSender,
    /// Channel for sending app events to the presentation layer
    app_event_sender: AppEventSender,
    /// Published lifecycle mode for synchronous reads at the handle
    mode_sender: watch::Sender<LinkMode>,
    /// Guards the event branch once the provider hung up
    events_open: bool,
    /// Whether the task should continue running
    running: bool,
}

impl LinkManagerTask {
    pub fn new(
        config: LinkConfig,
        command_receiver: CommandReceiver,
        command_sender: bluelink_core::channel::CommandSender,
        event_receiver: EventReceiver,
        effect_sender: EffectSender,
        app_event_sender: AppEventSender,
        mode_sender: watch::Sender<LinkMode>,
    ) -> Self {
        let retry = RetryScheduler::new(config.retry_delay, command_sender);
        Self {
            state: ManagerState::new(),
            config,
            retry,
            command_receiver,
            event_receiver,
            effect_sender,
            app_event_sender,
            mode_sender,
            events_open: true,
            running: true,
        }
    }

    /// Run the main Link Manager loop
    pub async fn run(&mut self) -> LinkResult<()> {
        info!("link manager starting");

        while self.running {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(cmd) => {
                            if let Err(e) = self.process_command(cmd).await {
                                match e {
                                    // Unrecoverable: a counterpart task is gone
                                    LinkError::ChannelClosed { .. } => {
                                        error!("channel closed, shutting down link manager: {}", e);
                                        self.running = false;
                                    }
                                    _ => error!("error processing command: {}", e),
                                }
                            }
                        }
                        None => {
                            info!("command channel closed, shutting down");
                            break;
                        }
                    }
                }

                event = self.event_receiver.recv(), if self.events_open => {
                    match event {
                        Some(evt) => {
                            if let Err(e) = self.process_event(evt).await {
                                match e {
                                    LinkError::ChannelClosed { .. } => {
                                        error!("channel closed, shutting down link manager: {}", e);
                                        self.running = false;
                                    }
                                    _ => error!("error processing event: {}", e),
                                }
                            }
                        }
                        None => {
                            // Keep serving commands so shutdown still works
                            info!("event channel closed");
                            self.events_open = false;
                        }
                    }
                }
            }
        }

        info!("link manager stopped");
        Ok(())
    }

    /// Process a command from the handle
    async fn process_command(&mut self, command: Command) -> LinkResult<()> {
        self.state.stats.commands_processed += 1;
        debug!(?command, "processing command");

        let mode_before = self.state.mode();

        let (effects, app_events) = match command {
            Command::Connect => CommandHandlers::handle_connect(&mut self.state)?,
            Command::Disconnect => CommandHandlers::handle_disconnect(&mut self.state)?,
            Command::Discover => CommandHandlers::handle_discover(&mut self.state)?,
            Command::SelectAddress { address } => {
                CommandHandlers::handle_select_address(&mut self.state, address)?
            }
            Command::SelectListing { listing } => CommandHandlers::handle_select_listing(
                &mut self.state,
                listing,
                self.config.address_display_len,
            )?,
            Command::SendFrame { frame } => {
                CommandHandlers::handle_send_frame(&mut self.state, frame)?
            }
            Command::RetryElapsed { generation } => {
                if !self.retry.consume(generation) {
                    return Ok(());
                }
                CommandHandlers::handle_retry_elapsed(&mut self.state)?
            }
            Command::Shutdown => {
                self.running = false;
                self.retry.cancel();
                (vec![Effect::Stop], Vec::new())
            }
        };

        self.finish_processing(mode_before, effects, app_events)
            .await
    }

    /// Process an event from the Link Provider
    async fn process_event(&mut self, event: LinkEvent) -> LinkResult<()> {
        self.state.stats.events_processed += 1;
        debug!(?event, "processing event");

        let mode_before = self.state.mode();

        let (effects, app_events) = match event {
            LinkEvent::NotSupported => CommandHandlers::handle_capability_lost(
                &mut self.state,
                CapabilityIssue::NotSupported,
            )?,
            LinkEvent::NotEnabled => CommandHandlers::handle_capability_lost(
                &mut self.state,
                CapabilityIssue::NotEnabled,
            )?,
            LinkEvent::Connecting { device } => {
                CommandHandlers::handle_connecting(&mut self.state, device)?
            }
            LinkEvent::Connected { device } => {
                CommandHandlers::handle_connected(&mut self.state, device)?
            }
            LinkEvent::Disconnected => CommandHandlers::handle_disconnected(&mut self.state)?,
            LinkEvent::ConnectionFailed { device } => {
                CommandHandlers::handle_connection_failed(&mut self.state, device)?
            }
            LinkEvent::DiscoveryStarted => {
                CommandHandlers::handle_discovery_started(&mut self.state)?
            }
            LinkEvent::DiscoveryFinished => {
                CommandHandlers::handle_discovery_finished(&mut self.state)?
            }
            LinkEvent::NoDevicesFound => {
                CommandHandlers::handle_no_devices_found(&mut self.state)?
            }
            LinkEvent::DevicesFound { devices } => {
                CommandHandlers::handle_devices_found(&mut self.state, devices)?
            }
            LinkEvent::DataReceived { byte } => {
                CommandHandlers::handle_data_received(&mut self.state, byte)?
            }
        };

        self.finish_processing(mode_before, effects, app_events)
            .await
    }

    /// Dispatch effects and app events, manage the retry timer, and publish
    /// mode changes
    async fn finish_processing(
        &mut self,
        mode_before: LinkMode,
        effects: Vec<Effect>,
        mut app_events: Vec<AppEvent>,
    ) -> LinkResult<()> {
        let mode_after = self.state.mode();

        // Leaving AwaitingRetry any way except the timer firing kills the
        // pending fire (consume already disarmed the firing path)
        if mode_before == LinkMode::AwaitingRetry && mode_after != LinkMode::AwaitingRetry {
            self.retry.cancel();
        }

        for effect in effects {
            self.send_effect(effect).await?;
        }

        if mode_after != mode_before {
            self.mode_sender.send_replace(mode_after);
            app_events.push(AppEvent::ModeChanged { mode: mode_after });
        }

        for app_event in app_events {
            self.send_app_event(app_event).await?;
        }

        Ok(())
    }

    /// Send an effect to the Link Provider
    ///
    /// `ScheduleRetry` never reaches the provider; it arms the local timer.
    async fn send_effect(&mut self, effect: Effect) -> LinkResult<()> {
        if matches!(effect, Effect::ScheduleRetry) {
            self.retry.arm();
            self.state.stats.retries_scheduled += 1;
            return Ok(());
        }

        debug!(?effect, "sending effect");
        self.effect_sender
            .send(effect)
            .await
            .map_err(|_| LinkError::ChannelClosed { channel: "effect" })?;

        self.state.stats.effects_issued += 1;
        Ok(())
    }

    /// Send an app event to the presentation layer
    async fn send_app_event(&mut self, app_event: AppEvent) -> LinkResult<()> {
        self.app_event_sender
            .send(app_event)
            .await
            .map_err(|_| LinkError::ChannelClosed {
                channel: "app_event",
            })?;

        self.state.stats.app_events_emitted += 1;
        Ok(())
    }

    /// Current statistics
    pub fn stats(&self) -> &ManagerStats {
        &self.state.stats
    }
}
