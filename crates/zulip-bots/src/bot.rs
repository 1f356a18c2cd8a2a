//! The bot capability.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use zulip_api::Message;

use crate::error::BotResult;

/// Free-form options a bot is constructed from.
pub type BotOptions = Map<String, Value>;

/// A bot that answers messages it is mentioned in.
///
/// The handler strips the mention before calling the bot, so for
/// `@**Echo** hello` the bot receives `"hello"` as `content_without_mention`
/// next to the full message.
///
/// The returned string is posted as the reply. An empty string means the bot
/// had nothing to say and is reported as an error.
///
/// # Example
///
/// ```rust,ignore
/// struct Shout;
///
/// #[async_trait]
/// impl Bot for Shout {
///     async fn handle_message(&self, _message: &Message, content: &str) -> BotResult<String> {
///         Ok(content.to_uppercase())
///     }
/// }
/// ```
#[async_trait]
pub trait Bot: Send + Sync {
    async fn handle_message(
        &self,
        message: &Message,
        content_without_mention: &str,
    ) -> BotResult<String>;
}

/// A shared bot.
pub type BoxedBot = Arc<dyn Bot>;
