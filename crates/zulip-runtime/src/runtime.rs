//! Process orchestration: one [`BotHandler`] per configured bot.
//!
//! ```rust,ignore
//! use zulip_runtime::BotRuntime;
//!
//! let runtime = BotRuntime::builder()
//!     .config_file("zulip-bots.toml")
//!     .profile("production")
//!     .build()?;
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use zulip_api::Zulip;
use zulip_bots::{BotHandler, build_bot};
use zulip_core::{BoxedHttpClient, Config};
use zulip_transport::ReqwestClient;

use crate::config::{BotConfig, ConfigLoader, RuntimeConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Runs every enabled bot from a [`RuntimeConfig`] until shutdown.
pub struct BotRuntime {
    config: RuntimeConfig,
    http: Option<BoxedHttpClient>,
}

impl BotRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime and installs logging from `config.logging`.
    ///
    /// The configuration is not validated here; [`RuntimeBuilder::build`]
    /// does that.
    pub fn from_config(config: RuntimeConfig) -> Self {
        logging::init_from_config(&config.logging);
        info!(
            log_level = %config.logging.level,
            bots = config.enabled_bots().count(),
            "Runtime initialized from configuration"
        );
        Self { config, http: None }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Shares one HTTP client between all bots instead of building a
    /// reqwest client per bot.
    pub fn with_http_client(mut self, http: BoxedHttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the handlers of all enabled bots.
    pub fn build_handlers(&self) -> RuntimeResult<Vec<BotHandler>> {
        self.config
            .enabled_bots()
            .map(|bot| self.build_handler(bot))
            .collect()
    }

    fn build_handler(&self, bot: &BotConfig) -> RuntimeResult<BotHandler> {
        let http: BoxedHttpClient = match &self.http {
            Some(http) => Arc::clone(http),
            None => Arc::new(ReqwestClient::with_timeout(self.config.server.timeout())?),
        };
        let account = Config::new(&bot.email, &bot.api_key, self.config.realm_url_for(bot));
        let instance = build_bot(&bot.bot, &bot.options).map_err(|source| RuntimeError::Bot {
            name: bot.name.clone(),
            source,
        })?;

        debug!(name = %bot.name, bot = %bot.bot, realm = %account.realm_url(), "Built bot handler");
        Ok(BotHandler::new(instance, Zulip::new(account, http))
            .name(&bot.name)
            .poll_interval(bot.poll_interval()))
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        info!("Zulip bots running. Press Ctrl+C to stop.");
        self.run_until(wait_for_shutdown()).await
    }

    /// Runs until `shutdown` completes or every bot has stopped.
    ///
    /// Returns the first bot failure if all bots stopped on their own. After
    /// shutdown, bot failures are only logged.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handlers = self.build_handlers()?;
        if handlers.is_empty() {
            return Err(RuntimeError::NoBots);
        }

        let token = CancellationToken::new();
        let mut bots = JoinSet::new();
        for (handler, bot) in handlers.into_iter().zip(self.config.enabled_bots()) {
            let name = bot.name.clone();
            let child = token.child_token();
            bots.spawn(async move {
                handler
                    .run(child)
                    .await
                    .map_err(|source| RuntimeError::Handler { name, source })
            });
        }
        info!(count = bots.len(), "Bots started");

        tokio::pin!(shutdown);
        let mut first_failure = None;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                joined = bots.join_next() => match joined {
                    Some(result) => record(result, &mut first_failure),
                    None => {
                        warn!("All bots stopped");
                        return first_failure.map_or(Ok(()), Err);
                    }
                },
            }
        }

        info!("Shutting down bots");
        token.cancel();
        let mut ignored = None;
        while let Some(result) = bots.join_next().await {
            record(result, &mut ignored);
        }
        info!("Runtime stopped");
        Ok(())
    }
}

fn record(
    result: Result<RuntimeResult<()>, tokio::task::JoinError>,
    first_failure: &mut Option<RuntimeError>,
) {
    match result {
        Ok(Ok(())) => {}
        // The handler has already logged the cause.
        Ok(Err(err)) => {
            if let RuntimeError::Handler { name, .. } = &err {
                warn!(bot = %name, "Bot stopped");
            }
            if first_failure.is_none() {
                *first_failure = Some(err);
            }
        }
        Err(err) => error!(error = %err, "Bot task panicked"),
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(err) => warn!(error = %err, "Cannot listen for SIGTERM"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(err) => {
            error!(error = %err, "Cannot listen for Ctrl+C, waiting forever");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads and validates configuration, then creates a [`BotRuntime`].
pub struct RuntimeBuilder {
    loader: ConfigLoader,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.loader = self.loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Merges configuration below files and environment.
    pub fn merge(mut self, config: RuntimeConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<BotRuntime> {
        let config = self.loader.load()?;
        validate_config(&config)?;
        Ok(BotRuntime::from_config(config))
    }
}
