//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Settings shared by every bot.
    #[serde(default)]
    pub server: ServerConfig,

    /// Individual bot configurations.
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

impl RuntimeConfig {
    /// Bots with `enabled = true`.
    pub fn enabled_bots(&self) -> impl Iterator<Item = &BotConfig> {
        self.bots.iter().filter(|b| b.enabled)
    }

    /// The realm a bot connects to: its own override, else the shared one.
    pub fn realm_url_for<'a>(&'a self, bot: &'a BotConfig) -> &'a str {
        bot.realm_url.as_deref().unwrap_or(&self.server.realm_url)
    }
}

// =============================================================================
// Server
// =============================================================================

/// Connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Realm root URL, e.g. `https://chat.zulip.org`.
    #[serde(default)]
    pub realm_url: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            realm_url: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    30000
}

// =============================================================================
// Bots
// =============================================================================

/// One bot account and the bot that answers on it.
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Unique name of this instance, used in logs.
    pub name: String,

    /// Registered bot to run, e.g. `"echo-bot"`.
    pub bot: String,

    /// Bot account email.
    pub email: String,

    /// Bot account API key.
    pub api_key: String,

    /// Overrides `server.realm_url` for this bot.
    #[serde(default)]
    pub realm_url: Option<String>,

    /// Whether this bot is started.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Options handed to the bot's constructor.
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl BotConfig {
    pub fn new(
        name: impl Into<String>,
        bot: impl Into<String>,
        email: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bot: bot.into(),
            email: email.into(),
            api_key: api_key.into(),
            realm_url: None,
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            options: Map::new(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("name", &self.name)
            .field("bot", &self.bot)
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .field("realm_url", &self.realm_url)
            .field("enabled", &self.enabled)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("options", &self.options)
            .finish()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    2000
}

// =============================================================================
// Logging
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level for every target.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file, for `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// When the log file is rotated.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `zulip_bots = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

/// Log verbosity. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| {
                format!("invalid log level `{s}`, expected one of: trace, debug, info, warn, error")
            })
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
