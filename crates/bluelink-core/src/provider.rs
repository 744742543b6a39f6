//! Link Provider task trait
//!
//! Defines the seam between the manager and whatever drives the radio.
//! Concrete implementations live outside this workspace (a real SPP/RFCOMM
//! stack, or the scripted stub provider used by the runtime's integration
//! tests).

use crate::channel::{EffectReceiver, EventSender};
use crate::LinkResult;

// ----------------------------------------------------------------------------
// Link Provider Task Trait
// ----------------------------------------------------------------------------

/// Common interface for Link Provider tasks
///
/// A provider task runs independently with its own async loop: it executes
/// [`Effect`](crate::channel::Effect)s received from the manager and reports
/// [`LinkEvent`](crate::channel::LinkEvent)s back. It shares no state with
/// the manager; the channels are the whole contract.
///
/// After executing [`Effect::Stop`](crate::channel::Effect::Stop) the
/// provider must emit no further events.
#[async_trait::async_trait]
pub trait LinkProviderTask: Send {
    /// Attach the channels created by the builder
    fn attach_channels(
        &mut self,
        event_sender: EventSender,
        effect_receiver: EffectReceiver,
    ) -> LinkResult<()>;

    /// Run the provider's main loop until `Stop` arrives or the effect
    /// channel closes
    async fn run(&mut self) -> LinkResult<()>;
}
