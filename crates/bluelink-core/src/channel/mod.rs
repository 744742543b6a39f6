//! Typed channel communication protocol
//!
//! All traffic between the presentation layer, the Link Manager task, and the
//! Link Provider flows through the message types defined here.

pub mod protocol;
pub mod utils;

pub use protocol::{AppEvent, Command, Effect, LinkEvent, LinkStatus};
pub use utils::{
    create_app_event_channel, create_command_channel, create_effect_channel, create_event_channel,
    AppEventReceiver, AppEventSender, ChannelError, CommandReceiver, CommandSender, EffectReceiver,
    EffectSender, EventReceiver, EventSender, NonBlockingSend,
};
