//! # Zulip
//!
//! A client for the Zulip REST API and a host for mention-driven bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │  BotRuntime  │────▶│ BotHandler │────▶│ Bot::handle_message      │
//! │  (config)    │     │ (long poll)│     │ (own task per mention)   │
//! └──────────────┘     └─────┬──────┘     └────────────┬─────────────┘
//!                            │ events                  │ reply
//!                            ▼                         ▼
//!                     ┌──────────────────────────────────────┐
//!                     │ Zulip: Events, Messages, Streams,    │
//!                     │        Users  over an HttpClient     │
//!                     └──────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! Plain API access:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zulip::prelude::*;
//!
//! let config = Config::new("me@example.com", "api-key", "https://chat.example.com");
//! let zulip = Zulip::new(config, Arc::new(ReqwestClient::new()?));
//! zulip.messages().send(MessageType::Stream, "general", Some("hello"), "Hi!").await?;
//! ```
//!
//! Bots from a config file:
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), zulip::runtime::RuntimeError> {
//!     zulip::runtime::BotRuntime::builder().build()?.run().await
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): `zulip-bots.toml` files
//! - `yaml-config`: `zulip-bots.yaml` files
//! - `json-log`: `format = "json"` logging
//! - `testing`: the scripted `MockHttpClient`

pub use zulip_api as api;
pub use zulip_bots as bots;
pub use zulip_core as core;
pub use zulip_runtime as runtime;
pub use zulip_transport as transport;

pub use zulip_bots::register_bot;

/// Commonly used types.
///
/// ```rust,ignore
/// use zulip::prelude::*;
/// ```
pub mod prelude {
    // Entry points
    pub use zulip_api::Zulip;
    pub use zulip_runtime::BotRuntime;
    pub use zulip_transport::ReqwestClient;

    // Account and transport contract
    pub use zulip_core::{BoxedHttpClient, Config, HttpClient, ZulipError, ZulipResult};

    // Resource models
    pub use zulip_api::{
        GetStreamsOptions, Message, MessageType, NarrowClause, RegisterOptions, StreamSpec,
        SubscribeOptions,
    };

    // Writing bots
    pub use zulip_bots::{Bot, BotError, BotHandler, BotOptions, BotResult, BoxedBot};
}
