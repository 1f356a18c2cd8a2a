//! # Zulip API
//!
//! Typed resource clients over the [`HttpClient`](zulip_core::HttpClient)
//! contract.
//!
//! | Client | Endpoints |
//! |--------|-----------|
//! | [`Messages`] | `messages`, `messages/render`, `messages/{id}` |
//! | [`Streams`] | `streams`, `get_stream_id`, `users/me/subscriptions` |
//! | [`Users`] | `users`, `users/me` |
//! | [`Events`] | `register`, `events` |
//!
//! All clients come from a [`Zulip`] handle and share its configuration and
//! HTTP client.

pub mod client;
pub mod events;
pub mod messages;
pub mod model;
pub mod streams;
pub mod users;

pub use client::{ApiClient, Zulip};
pub use events::Events;
pub use messages::Messages;
pub use model::{
    EventQueue, GetStreamsOptions, Message, MessageType, NO_EVENT_ID, NarrowClause, Profile,
    QueueEvent, RegisterOptions, Stream, StreamSpec, SubscribeOptions, SubscribeResult,
    Subscription, UnsubscribeResult, User,
};
pub use streams::Streams;
pub use users::Users;
