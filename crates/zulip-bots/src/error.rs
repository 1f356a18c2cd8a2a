//! Error types for bots and the bot handler.

use thiserror::Error;

use zulip_core::ZulipError;

/// Errors produced by a bot or while constructing one.
#[derive(Debug, Clone, Error)]
pub enum BotError {
    /// The bot could not produce a reply.
    #[error("bot failed: {0}")]
    Failed(String),

    /// An API call made by the bot failed.
    #[error(transparent)]
    Api(#[from] ZulipError),

    /// No bot is registered under this name.
    #[error("unknown bot: {0}")]
    UnknownBot(String),

    /// The options map is not usable by this bot.
    #[error("invalid options for bot `{bot}`: {reason}")]
    InvalidOptions { bot: String, reason: String },
}

impl BotError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn invalid_options(bot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            bot: bot.into(),
            reason: reason.into(),
        }
    }
}

/// An error reported by [`BotHandler`](crate::BotHandler) while it keeps
/// running.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Api(#[from] ZulipError),

    #[error(transparent)]
    Bot(#[from] BotError),
}

impl HandlerError {
    /// The API error, if this is one.
    pub fn as_api(&self) -> Option<&ZulipError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Bot(_) => None,
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
