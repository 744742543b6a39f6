//! Channel construction utilities
//!
//! Bounded tokio mpsc channels for all four directions. The core owns the
//! single consumer of commands and events, so plain mpsc suffices everywhere
//! (one provider, one presentation layer).

use core::fmt;

use crate::channel::protocol::{AppEvent, Command, Effect, LinkEvent};
use crate::config::ChannelConfig;

// ----------------------------------------------------------------------------
// Channel Type Aliases
// ----------------------------------------------------------------------------

pub type CommandSender = tokio::sync::mpsc::Sender<Command>;
pub type CommandReceiver = tokio::sync::mpsc::Receiver<Command>;
pub type EventSender = tokio::sync::mpsc::Sender<LinkEvent>;
pub type EventReceiver = tokio::sync::mpsc::Receiver<LinkEvent>;
pub type EffectSender = tokio::sync::mpsc::Sender<Effect>;
pub type EffectReceiver = tokio::sync::mpsc::Receiver<Effect>;
pub type AppEventSender = tokio::sync::mpsc::Sender<AppEvent>;
pub type AppEventReceiver = tokio::sync::mpsc::Receiver<AppEvent>;

// ----------------------------------------------------------------------------
// Errors
// ----------------------------------------------------------------------------

#[derive(Debug)]
pub enum ChannelError {
    ChannelFull,
    ChannelClosed,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::ChannelFull => write!(f, "channel buffer is full"),
            ChannelError::ChannelClosed => write!(f, "channel is closed"),
        }
    }
}

impl std::error::Error for ChannelError {}

// ----------------------------------------------------------------------------
// Channel Creation Utilities
// ----------------------------------------------------------------------------

/// Create the bounded command channel (presentation → manager)
pub fn create_command_channel(config: &ChannelConfig) -> (CommandSender, CommandReceiver) {
    tokio::sync::mpsc::channel(config.command_buffer_size)
}

/// Create the bounded event channel (provider → manager)
pub fn create_event_channel(config: &ChannelConfig) -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::channel(config.event_buffer_size)
}

/// Create the bounded effect channel (manager → provider)
pub fn create_effect_channel(config: &ChannelConfig) -> (EffectSender, EffectReceiver) {
    tokio::sync::mpsc::channel(config.effect_buffer_size)
}

/// Create the bounded app event channel (manager → presentation)
pub fn create_app_event_channel(config: &ChannelConfig) -> (AppEventSender, AppEventReceiver) {
    tokio::sync::mpsc::channel(config.app_event_buffer_size)
}

// ----------------------------------------------------------------------------
// Non-blocking Send Utilities
// ----------------------------------------------------------------------------

/// Non-blocking send so presentation code never stalls on a full buffer
pub trait NonBlockingSend<T> {
    fn try_send_non_blocking(&self, message: T) -> Result<(), ChannelError>;
}

impl NonBlockingSend<Command> for CommandSender {
    fn try_send_non_blocking(&self, command: Command) -> Result<(), ChannelError> {
        self.try_send(command).map_err(|e| match e {
            tokio::sync::mpsc::error::TrySendError::Full(_) => ChannelError::ChannelFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => ChannelError::ChannelClosed,
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_channel_round_trip() {
        let config = ChannelConfig::default();
        let (sender, mut receiver) = create_command_channel(&config);

        sender.send(Command::Discover).await.unwrap();
        assert!(matches!(receiver.recv().await, Some(Command::Discover)));
    }

    #[tokio::test]
    async fn test_non_blocking_send_reports_full() {
        let config = ChannelConfig {
            command_buffer_size: 1,
            ..ChannelConfig::default()
        };
        let (sender, _receiver) = create_command_channel(&config);

        sender.try_send_non_blocking(Command::Discover).unwrap();
        let err = sender.try_send_non_blocking(Command::Discover).unwrap_err();
        assert!(matches!(err, ChannelError::ChannelFull));
    }

    #[tokio::test]
    async fn test_non_blocking_send_reports_closed() {
        let config = ChannelConfig::default();
        let (sender, receiver) = create_command_channel(&config);
        drop(receiver);

        let err = sender.try_send_non_blocking(Command::Connect).unwrap_err();
        assert!(matches!(err, ChannelError::ChannelClosed));
    }
}
