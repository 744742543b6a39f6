//! Reconnect retry scheduler
//!
//! One-shot timer that feeds [`Command::RetryElapsed`] back into the manager's
//! own command channel. Cancellation is by generation token, not by aborting
//! the sleeping task: arming or cancelling bumps the generation, and a fire
//! carrying a stale generation is dropped at the manager before it can reach
//! the state machine. Only one timer is ever live.

use std::time::Duration;

use bluelink_core::channel::CommandSender;
use bluelink_core::Command;
use tracing::debug;

// ----------------------------------------------------------------------------
// Retry Scheduler
// ----------------------------------------------------------------------------

/// Generation-tokened one-shot reconnect timer
pub struct RetryScheduler {
    delay: Duration,
    command_sender: CommandSender,
    /// Bumped on every arm and cancel; the live timer carries the value it
    /// was armed with
    generation: u64,
    armed: bool,
}

impl RetryScheduler {
    pub fn new(delay: Duration, command_sender: CommandSender) -> Self {
        Self {
            delay,
            command_sender,
            generation: 0,
            armed: false,
        }
    }

    /// Arm the timer, invalidating any previously armed fire
    ///
    /// The spawned sleep is never aborted; its fire simply arrives with a
    /// generation that [`consume`](Self::consume) no longer accepts.
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.armed = true;

        let generation = self.generation;
        let delay = self.delay;
        let sender = self.command_sender.clone();
        debug!(generation, ?delay, "arming reconnect timer");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The manager may already be gone; a closed channel is fine here
            let _ = sender.send(Command::RetryElapsed { generation }).await;
        });

        generation
    }

    /// Cancel the armed timer, if any
    pub fn cancel(&mut self) {
        if self.armed {
            debug!(generation = self.generation, "cancelling reconnect timer");
            self.generation += 1;
            self.armed = false;
        }
    }

    /// Whether a fire with this generation is the armed one
    pub fn is_current(&self, generation: u64) -> bool {
        self.armed && generation == self.generation
    }

    /// Accept a timer fire: returns true exactly once per armed generation
    pub fn consume(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.armed = false;
            true
        } else {
            debug!(
                generation,
                current = self.generation,
                "dropping stale reconnect timer fire"
            );
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
