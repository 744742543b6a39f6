//! Command frames sent over the established link
//!
//! A frame is an opaque, immutable payload passed to the Link Provider
//! unchanged. Serial modules in the target class speak short line-oriented
//! commands such as `#10c12n\r`, so a text constructor is provided alongside
//! raw bytes.

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Command Frame
// ----------------------------------------------------------------------------

/// Immutable byte payload for transmission to the remote device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame(Vec<u8>);

impl CommandFrame {
    /// Create a frame from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Create a frame from a textual command
    pub fn from_text(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }

    /// Get the payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CommandFrame {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<Vec<u8>> for CommandFrame {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
