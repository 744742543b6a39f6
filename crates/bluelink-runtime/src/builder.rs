//! Link Manager builder API
//!
//! Wires the four typed channels, spawns the serialized manager task and the
//! Link Provider, and hands the caller a [`LinkHandle`] for commands, mode
//! reads, and app events.

use bluelink_core::channel::{
    create_app_event_channel, create_command_channel, create_effect_channel, create_event_channel,
    AppEventReceiver, ChannelError, CommandSender, EffectReceiver, EventSender, NonBlockingSend,
};
use bluelink_core::{
    Command, CommandFrame, DeviceAddress, LinkConfig, LinkError, LinkMode, LinkProviderTask,
    LinkResult,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::info;

use crate::logic::LinkManagerTask;

// ----------------------------------------------------------------------------
// Link Manager Builder
// ----------------------------------------------------------------------------

/// Builder for the link manager runtime
pub struct LinkManagerBuilder {
    config: LinkConfig,
}

impl LinkManagerBuilder {
    pub fn new() -> Self {
        Self {
            config: LinkConfig::default(),
        }
    }

    /// Set the full configuration
    pub fn with_config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the reconnect delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Create the manager task, its handle, and the provider's channel
    /// endpoints without spawning anything
    ///
    /// Integration tests use this to play the provider role directly.
    pub fn build(self) -> (LinkManagerTask, LinkHandle, ProviderEndpoints) {
        let channels = &self.config.channels;
        let (command_sender, command_receiver) = create_command_channel(channels);
        let (event_sender, event_receiver) = create_event_channel(channels);
        let (effect_sender, effect_receiver) = create_effect_channel(channels);
        let (app_event_sender, app_event_receiver) = create_app_event_channel(channels);
        let (mode_sender, mode_receiver) = watch::channel(LinkMode::Idle);

        let task = LinkManagerTask::new(
            self.config,
            command_receiver,
            command_sender.clone(),
            event_receiver,
            effect_sender,
            app_event_sender,
            mode_sender,
        );

        let handle = LinkHandle {
            command_sender,
            mode: mode_receiver,
            app_event_receiver: Some(app_event_receiver),
            manager_handle: None,
            provider_handle: None,
        };

        let endpoints = ProviderEndpoints {
            event_sender,
            effect_receiver,
        };

        (task, handle, endpoints)
    }

    /// Build and start the manager together with a Link Provider
    pub async fn build_and_start(
        self,
        mut provider: Box<dyn LinkProviderTask>,
    ) -> LinkResult<LinkHandle> {
        info!("starting link manager runtime");

        let (mut task, mut handle, endpoints) = self.build();
        endpoints.attach_to(provider.as_mut())?;

        handle.manager_handle = Some(tokio::spawn(async move { task.run().await }));
        handle.provider_handle = Some(tokio::spawn(async move { provider.run().await }));

        Ok(handle)
    }
}

impl Default for LinkManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Provider Endpoints
// ----------------------------------------------------------------------------

/// The channel endpoints a Link Provider needs
pub struct ProviderEndpoints {
    pub event_sender: EventSender,
    pub effect_receiver: EffectReceiver,
}

impl ProviderEndpoints {
    /// Hand the endpoints to a provider implementation
    pub fn attach_to(self, provider: &mut dyn LinkProviderTask) -> LinkResult<()> {
        provider.attach_channels(self.event_sender, self.effect_receiver)
    }
}

// ----------------------------------------------------------------------------
// Link Handle
// ----------------------------------------------------------------------------

/// Handle to a running link manager
pub struct LinkHandle {
    command_sender: CommandSender,
    mode: watch::Receiver<LinkMode>,
    app_event_receiver: Option<AppEventReceiver>,
    manager_handle: Option<JoinHandle<LinkResult<()>>>,
    provider_handle: Option<JoinHandle<LinkResult<()>>>,
}

impl LinkHandle {
    /// Current lifecycle mode, read without touching the manager
    pub fn mode(&self) -> LinkMode {
        *self.mode.borrow()
    }

    /// A watch receiver for observing mode changes
    pub fn mode_watch(&self) -> watch::Receiver<LinkMode> {
        self.mode.clone()
    }

    /// Take the app event receiver (can only be taken once)
    pub fn take_app_event_receiver(&mut self) -> Option<AppEventReceiver> {
        self.app_event_receiver.take()
    }

    /// Toggle: connect to the selected address, or disconnect when connected
    pub async fn connect(&self) -> LinkResult<()> {
        self.send_command(Command::Connect).await
    }

    /// Disconnect, or abandon an in-progress attempt or pending retry
    pub async fn disconnect(&self) -> LinkResult<()> {
        self.send_command(Command::Disconnect).await
    }

    /// Start a candidate-listing discovery cycle
    pub async fn discover(&self) -> LinkResult<()> {
        self.send_command(Command::Discover).await
    }

    /// Select the address targeted by the next connect attempt
    pub async fn select_address(&self, address: DeviceAddress) -> LinkResult<()> {
        self.send_command(Command::SelectAddress { address }).await
    }

    /// Select the target by a formatted candidate listing
    pub async fn select_listing(&self, listing: impl Into<String>) -> LinkResult<()> {
        self.send_command(Command::SelectListing {
            listing: listing.into(),
        })
        .await
    }

    /// Send a command frame over the established link
    ///
    /// Checked against the published mode before anything is enqueued, so a
    /// send while not connected fails here and the provider never sees it.
    pub fn send_frame(&self, frame: CommandFrame) -> LinkResult<()> {
        if self.mode() != LinkMode::Connected {
            return Err(LinkError::NotConnected);
        }

        self.command_sender
            .try_send_non_blocking(Command::SendFrame { frame })
            .map_err(|e| match e {
                ChannelError::ChannelFull => LinkError::ChannelBusy { channel: "command" },
                ChannelError::ChannelClosed => LinkError::ChannelClosed { channel: "command" },
            })
    }

    /// Whether the manager task is still running
    pub fn is_running(&self) -> bool {
        self.manager_handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Shut down the manager and provider gracefully
    pub async fn shutdown(&mut self) -> LinkResult<()> {
        info!("shutting down link manager runtime");

        let _ = self.send_command(Command::Shutdown).await;

        if let Some(handle) = self.manager_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
        if let Some(handle) = self.provider_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        Ok(())
    }

    async fn send_command(&self, command: Command) -> LinkResult<()> {
        self.command_sender
            .send(command)
            .await
            .map_err(|_| LinkError::ChannelClosed { channel: "command" })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
