//! # Zulip Runtime
//!
//! Turns a configuration file into running bots:
//!
//! - [`config`]: layered loading (defaults, files, `ZULIP_*` environment) and validation
//! - [`logging`]: tracing subscriber set up from `[logging]`
//! - [`BotRuntime`]: one bot handler per `[[bots]]` entry, stopped on Ctrl+C or SIGTERM
//!
//! ```toml
//! [server]
//! realm_url = "https://chat.example.com"
//!
//! [[bots]]
//! name = "echo"
//! bot = "echo-bot"
//! email = "echo-bot@chat.example.com"
//! api_key = "..."
//! ```
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), zulip_runtime::RuntimeError> {
//!     zulip_runtime::BotRuntime::builder().build()?.run().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig, Profile, RuntimeConfig,
    ServerConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{BotRuntime, RuntimeBuilder, wait_for_shutdown};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
