//! Tracing subscriber setup.
//!
//! ```rust,ignore
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//!
//! // or by hand
//! LoggingBuilder::new()
//!     .with_level(Level::DEBUG)
//!     .directive("zulip_api=trace")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-target
//! directives are added on top either way.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

/// File name used when `file_path` names only a directory.
const DEFAULT_LOG_FILE: &str = "zulip-bots.log";

/// Which span lifecycle events are written.
///
/// Each bot dispatch runs inside a `dispatch` span, so [`SpanEvents::LIFECYCLE`]
/// shows when every reply starts and finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Creation and close only.
    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Builder for the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: tracing::Level,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
    with_target: bool,
    with_thread_ids: bool,
    with_file_location: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            with_target: true,
            with_thread_ids: false,
            with_file_location: false,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut directives: Vec<String> = config
            .filters
            .iter()
            .map(|(target, level)| format!("{target}={level}"))
            .collect();
        directives.sort();

        Self {
            level: config.level.to_tracing_level(),
            directives,
            span_events: SpanEvents::from(&config.span_events),
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            rotation: config.rotation,
            with_target: true,
            with_thread_ids: config.thread_ids,
            with_file_location: config.file_location,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive such as `"zulip_bots=debug"`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Writes to `path`, rotating as configured. Implies [`LogOutput::File`].
    pub fn file(mut self, path: impl Into<PathBuf>, rotation: LogRotation) -> Self {
        self.output = LogOutput::File;
        self.file_path = Some(path.into());
        self.rotation = rotation;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include source file and line number.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.with_file_location = enabled;
        self
    }

    /// Directives that failed to parse are skipped.
    fn build_filter(&self) -> EnvFilter {
        let base = self.level.as_str().to_lowercase();
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base));
        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => eprintln!("ignoring invalid log directive `{directive}`"),
            }
        }
        filter
    }

    fn file_appender(&self) -> Option<RollingFileAppender> {
        let path = self.file_path.as_deref()?;
        let (dir, name) = split_log_path(path);
        Some(RollingFileAppender::new(self.rotation.into(), dir, name))
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber, failing if one is already installed.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let span_events = self.span_events.to_fmt_span();

        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events.clone())
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file_location)
                    .with_line_number(self.with_file_location)
            };
        }

        macro_rules! init_with_writer {
            ($writer:expr) => {{
                let registry = tracing_subscriber::registry().with(filter);
                match self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry
                        .with(configure_layer!(fmt::layer().json().with_writer($writer)))
                        .try_init(),
                    #[cfg(not(feature = "json-log"))]
                    LogFormat::Json => {
                        eprintln!("json logging needs the `json-log` feature, using compact");
                        registry
                            .with(configure_layer!(fmt::layer().compact().with_writer($writer)))
                            .try_init()
                    }
                    LogFormat::Compact => registry
                        .with(configure_layer!(fmt::layer().compact().with_writer($writer)))
                        .try_init(),
                    LogFormat::Full => registry
                        .with(configure_layer!(fmt::layer().with_writer($writer)))
                        .try_init(),
                    LogFormat::Pretty => registry
                        .with(configure_layer!(fmt::layer().pretty().with_writer($writer)))
                        .try_init(),
                }
            }};
        }

        match self.output {
            LogOutput::Stdout => init_with_writer!(std::io::stdout),
            LogOutput::Stderr => init_with_writer!(std::io::stderr),
            LogOutput::File => match self.file_appender() {
                Some(appender) => init_with_writer!(appender),
                None => {
                    eprintln!("file logging requested without logging.file_path, using stdout");
                    init_with_writer!(std::io::stdout)
                }
            },
        }
    }
}

/// Splits a log file path into its directory and file name.
fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
    (dir, name)
}
