//! Wire models for the resource clients.

mod event;
mod message;
mod stream;
mod user;

pub(crate) use event::encode;
pub use event::{EventQueue, NO_EVENT_ID, QueueEvent, RegisterOptions};
pub use message::{Message, MessageType, NarrowClause};
pub use stream::{
    GetStreamsOptions, Stream, StreamSpec, SubscribeOptions, SubscribeResult, Subscription,
    UnsubscribeResult,
};
pub use user::{Profile, User};
