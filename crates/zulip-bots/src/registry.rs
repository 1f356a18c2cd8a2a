//! Link-time registry of bot constructors.
//!
//! Every crate linked into the binary can contribute bots with
//! [`register_bot!`](crate::register_bot); the runtime looks them up by the
//! name used in configuration.
//!
//! ```rust,ignore
//! fn build(_options: &BotOptions) -> BotResult<BoxedBot> {
//!     Ok(Arc::new(Shout))
//! }
//!
//! zulip_bots::register_bot!(SHOUT_BOT, "shout-bot", "Replies in capitals.", build);
//! ```

use linkme::distributed_slice;
use tracing::warn;

use crate::bot::{BotOptions, BoxedBot};
use crate::error::{BotError, BotResult};

/// Constructs a bot from its options.
pub type BuildBotFn = fn(&BotOptions) -> BotResult<BoxedBot>;

/// A registered bot.
#[derive(Clone, Copy)]
pub struct BotDescriptor {
    /// Name used in configuration, e.g. `"echo-bot"`.
    pub name: &'static str,
    pub description: &'static str,
    pub build: BuildBotFn,
}

impl std::fmt::Debug for BotDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// All registered bots.
#[distributed_slice]
pub static BOTS: [BotDescriptor];

/// Registers a bot constructor under a name.
///
/// `$static_name` only has to be unique within the calling module.
#[macro_export]
macro_rules! register_bot {
    ($static_name:ident, $name:expr, $description:expr, $build:expr $(,)?) => {
        #[$crate::linkme::distributed_slice($crate::registry::BOTS)]
        #[linkme(crate = $crate::linkme)]
        static $static_name: $crate::registry::BotDescriptor = $crate::registry::BotDescriptor {
            name: $name,
            description: $description,
            build: $build,
        };
    };
}

/// Looks up a bot by name.
///
/// If several bots share a name a warning is emitted and the first one wins.
pub fn find_bot(name: &str) -> Option<&'static BotDescriptor> {
    let mut matches = BOTS.iter().filter(|d| d.name == name);
    let first = matches.next()?;

    let extra = matches.count();
    if extra > 0 {
        warn!(
            bot = name,
            count = extra + 1,
            "Multiple bots registered under one name, using first"
        );
    }
    Some(first)
}

/// Names of all registered bots, sorted.
pub fn bot_names() -> Vec<&'static str> {
    let mut names: Vec<_> = BOTS.iter().map(|d| d.name).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Builds the bot registered under `name`.
pub fn build_bot(name: &str, options: &BotOptions) -> BotResult<BoxedBot> {
    let descriptor = find_bot(name).ok_or_else(|| BotError::UnknownBot(name.to_string()))?;
    (descriptor.build)(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bots_are_registered() {
        assert!(bot_names().contains(&"echo-bot"));
        let descriptor = find_bot("echo-bot").unwrap();
        assert!(!descriptor.description.is_empty());
    }

    #[test]
    fn test_build_unknown_bot() {
        let err = build_bot("no-such-bot", &BotOptions::new())
            .err()
            .expect("unknown bot must fail");
        assert!(matches!(err, BotError::UnknownBot(name) if name == "no-such-bot"));
    }
}
