//! Runtime error types.

use thiserror::Error;
use zulip_bots::BotError;
use zulip_core::{TransportError, ZulipError};

use crate::config::ConfigError;

/// Errors from building or running the bots.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Transport(#[from] TransportError),

    /// A bot could not be constructed.
    #[error("Failed to build bot `{name}`: {source}")]
    Bot {
        name: String,
        #[source]
        source: BotError,
    },

    /// A bot stopped because it could not start.
    #[error("Bot `{name}` failed: {source}")]
    Handler {
        name: String,
        #[source]
        source: ZulipError,
    },

    /// No bot is enabled in the configuration.
    #[error("No bots enabled")]
    NoBots,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
