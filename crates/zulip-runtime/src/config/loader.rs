//! Layered configuration loading with figment.
//!
//! # Sources (lowest to highest priority)
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides ([`ConfigLoader::merge`])
//! 3. Profile file (`zulip-bots.{profile}.toml`)
//! 4. Main file (`zulip-bots.toml`)
//! 5. Environment variables (`ZULIP_*`)
//!
//! With the `yaml-config` feature, `zulip-bots.yaml` / `zulip-bots.yml` (and
//! their profile variants) are searched as well.
//!
//! # Environment Variables
//!
//! `__` separates nesting levels:
//!
//! - `ZULIP_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `ZULIP_SERVER__REALM_URL=https://chat.example.com` → `server.realm_url`
//! - `ZULIP_PROFILE=production` selects the profile
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .file("deploy/zulip-bots.toml")
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::RuntimeConfig;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "ZULIP_";

/// Stem of the configuration file names.
pub const FILE_STEM: &str = "zulip-bots";

/// Configuration profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev` and `prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `ZULIP_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(format!("{ENV_PREFIX}PROFILE"))
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for configuration files.
    ///
    /// Without any, the current directory and the user config directory
    /// (`~/.config/zulip-bots` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration values below the files and the environment.
    pub fn merge(mut self, config: RuntimeConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<RuntimeConfig> {
        let profile = self.profile.clone();
        let config: RuntimeConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            bots = config.bots.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RuntimeConfig::default()));
        figment = figment.merge(std::mem::replace(&mut self.figment, Figment::new()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = merge_file(figment, path)?;
        } else {
            figment = self.search_files(figment);
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(FILE_STEM));
        }
        paths
    }

    /// Merges the first directory's files that exist, profile file first.
    #[allow(unused_mut)]
    fn search_files(&self, mut figment: Figment) -> Figment {
        let extensions: &[&str] = &[
            #[cfg(feature = "toml-config")]
            "toml",
            #[cfg(feature = "yaml-config")]
            "yaml",
            #[cfg(feature = "yaml-config")]
            "yml",
        ];

        for dir in self.resolve_search_paths() {
            for ext in extensions {
                let profile_path = dir.join(format!("{FILE_STEM}.{}.{ext}", self.profile));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile configuration");
                    figment = merge_file(figment.clone(), &profile_path).unwrap_or(figment);
                }

                let base_path = dir.join(format!("{FILE_STEM}.{ext}"));
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return merge_file(figment.clone(), &base_path).unwrap_or(figment);
                }
            }
        }

        warn!("No configuration file found, using defaults");
        figment
    }
}

/// Merges one file, choosing the format from its extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => {
            let _ = figment;
            Err(ConfigError::UnsupportedFormat(ext.to_string()))
        }
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<RuntimeConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from one file plus the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<RuntimeConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use figment::Jail;

    const BASE: &str = r#"
        [logging]
        level = "warn"

        [server]
        realm_url = "https://chat.example.com"

        [[bots]]
        name = "echo"
        bot = "echo-bot"
        email = "echo-bot@example.com"
        api_key = "secret"

        [bots.options]
        greeting = "hi"
    "#;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Info);
            assert!(config.bots.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_loads_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file("zulip-bots.toml", BASE)?;
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.server.realm_url, "https://chat.example.com");
            assert_eq!(config.server.timeout_ms, 30000);
            assert_eq!(config.bots.len(), 1);
            assert_eq!(config.bots[0].bot, "echo-bot");
            assert_eq!(config.bots[0].options["greeting"], "hi");
            Ok(())
        });
    }

    #[test]
    fn test_main_file_overrides_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "zulip-bots.production.toml",
                r#"
                    [logging]
                    level = "error"
                    format = "json"

                    [server]
                    timeout_ms = 5000
                "#,
            )?;
            jail.create_file("zulip-bots.toml", BASE)?;

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Warn);
            assert_eq!(config.server.timeout_ms, 5000);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("zulip-bots.toml", BASE)?;
            jail.set_env("ZULIP_LOGGING__LEVEL", "debug");
            jail.set_env("ZULIP_SERVER__REALM_URL", "https://override.example.com");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.server.realm_url, "https://override.example.com");
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env("ZULIP_PROFILE", "production");
            assert_eq!(Profile::from_env(), Profile::Production);
            jail.set_env("ZULIP_PROFILE", "Staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".into()));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        Jail::expect_with(|jail| {
            let missing = jail.directory().join("missing.toml");
            let result = ConfigLoader::new().file(&missing).without_env().load();
            assert!(matches!(result, Err(ConfigError::FileNotFound(path)) if path == missing));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("bots.ini", "level = debug")?;
            let result = ConfigLoader::new()
                .file(jail.directory().join("bots.ini"))
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_level_is_parse_error() {
        Jail::expect_with(|jail| {
            jail.create_file("zulip-bots.toml", "[logging]\nlevel = \"loud\"\n")?;
            let result = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load();
            assert!(matches!(result, Err(ConfigError::ParseError(_))));
            Ok(())
        });
    }
}
