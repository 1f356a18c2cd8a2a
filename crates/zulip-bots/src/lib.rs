//! # Zulip Bots
//!
//! Hosts a [`Bot`] on a Zulip account: the [`BotHandler`] long-polls the
//! account's event queue, picks out messages that start with a mention of the
//! bot, and posts the bot's answer back where the message came from.
//!
//! ```rust,ignore
//! let handler = BotHandler::new(build_bot("echo-bot", &BotOptions::new())?, zulip);
//! handler.run(shutdown_token).await?;
//! ```
//!
//! Bots are found by name through a link-time registry, see
//! [`register_bot!`].

pub mod bot;
pub mod bots;
pub mod error;
pub mod handler;
pub mod mention;
pub mod registry;
pub mod reply;

#[doc(hidden)]
pub use linkme;

pub use bot::{Bot, BotOptions, BoxedBot};
pub use error::{BotError, BotResult, HandlerError};
pub use handler::{BotHandler, DEFAULT_POLL_INTERVAL, ErrorHook, Session};
pub use mention::Mention;
pub use registry::{BotDescriptor, bot_names, build_bot, find_bot};
pub use reply::ReplyTarget;
