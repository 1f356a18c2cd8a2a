use std::sync::Arc;

use async_trait::async_trait;

use zulip_api::Message;

use crate::bot::{Bot, BotOptions, BoxedBot};
use crate::error::BotResult;

/// Replies with whatever followed the mention. Takes no options.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBot;

#[async_trait]
impl Bot for EchoBot {
    async fn handle_message(
        &self,
        _message: &Message,
        content_without_mention: &str,
    ) -> BotResult<String> {
        Ok(content_without_mention.to_string())
    }
}

fn build(_options: &BotOptions) -> BotResult<BoxedBot> {
    Ok(Arc::new(EchoBot))
}

crate::register_bot!(
    ECHO_BOT,
    "echo-bot",
    "Replies with the content it was mentioned with.",
    build
);
