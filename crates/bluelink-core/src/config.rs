//! Configuration for the link manager

use std::time::Duration;

use crate::types::ADDRESS_DISPLAY_LEN;

// ----------------------------------------------------------------------------
// Link Configuration
// ----------------------------------------------------------------------------

/// Configuration for the Link Manager
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LinkConfig {
    /// Delay before a scheduled reconnect attempt fires
    pub retry_delay: Duration,
    /// Expected length of the address suffix on candidate listings
    pub address_display_len: usize,
    /// Channel buffer sizes
    pub channels: ChannelConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(3000),
            address_display_len: ADDRESS_DISPLAY_LEN,
            channels: ChannelConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reconnect delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the channel buffer sizes
    pub fn with_channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = channels;
        self
    }
}

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Buffer sizes for the four typed channels
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ChannelConfig {
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    pub effect_buffer_size: usize,
    pub app_event_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            event_buffer_size: 64,
            effect_buffer_size: 32,
            app_event_buffer_size: 64,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_delay_is_three_seconds() {
        let config = LinkConfig::default();
        assert_eq!(config.retry_delay, Duration::from_millis(3000));
        assert_eq!(config.address_display_len, 17);
    }

    #[test]
    fn test_builder_methods() {
        let config = LinkConfig::new().with_retry_delay(Duration::from_millis(500));
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }
}
