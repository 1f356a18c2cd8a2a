//! Checks that run after loading and before any bot starts.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, LogOutput, LoggingConfig, RuntimeConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &RuntimeConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;

    if config.server.timeout_ms == 0 {
        return Err(ConfigError::validation("server.timeout_ms must be greater than 0"));
    }

    let mut seen = HashSet::new();
    for bot in &config.bots {
        if !seen.insert(bot.name.as_str()) {
            return Err(ConfigError::DuplicateBotName(bot.name.clone()));
        }
        validate_bot(config, bot)?;
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    if logging.filters.keys().any(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation("logging.filters keys must name a target"));
    }
    Ok(())
}

fn validate_bot(config: &RuntimeConfig, bot: &BotConfig) -> ConfigResult<()> {
    if bot.name.trim().is_empty() {
        return Err(ConfigError::missing_field("bots.name"));
    }
    if bot.bot.trim().is_empty() {
        return Err(ConfigError::missing_field(format!("bots[{}].bot", bot.name)));
    }
    if bot.email.trim().is_empty() {
        return Err(ConfigError::missing_field(format!("bots[{}].email", bot.name)));
    }
    if bot.api_key.is_empty() {
        return Err(ConfigError::missing_field(format!("bots[{}].api_key", bot.name)));
    }
    if bot.poll_interval_ms == 0 {
        return Err(ConfigError::validation(format!(
            "bots[{}].poll_interval_ms must be greater than 0",
            bot.name
        )));
    }

    validate_realm_url(config.realm_url_for(bot))
}

fn validate_realm_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("server.realm_url"));
    }

    const SCHEMES: [&str; 2] = ["http://", "https://"];
    match SCHEMES.iter().find_map(|s| url.strip_prefix(s)) {
        None => Err(ConfigError::invalid_url(
            url,
            "realm URL must start with http:// or https://",
        )),
        Some(host) if host.trim_matches('/').is_empty() => {
            Err(ConfigError::invalid_url(url, "realm URL has no host"))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(bots: Vec<BotConfig>) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.server.realm_url = "https://chat.example.com".into();
        config.bots = bots;
        config
    }

    fn echo(name: &str) -> BotConfig {
        BotConfig::new(name, "echo-bot", "echo-bot@example.com", "secret")
    }

    #[test]
    fn test_validate_empty_config() {
        assert!(validate_config(&RuntimeConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_good_config() {
        assert!(validate_config(&config_with(vec![echo("a"), echo("b")])).is_ok());
    }

    #[test]
    fn test_duplicate_bot_name() {
        let result = validate_config(&config_with(vec![echo("a"), echo("a")]));
        assert!(matches!(result, Err(ConfigError::DuplicateBotName(name)) if name == "a"));
    }

    #[test]
    fn test_missing_credentials() {
        let mut bot = echo("a");
        bot.api_key.clear();
        let result = validate_config(&config_with(vec![bot]));
        assert!(matches!(result, Err(ConfigError::MissingField { field }) if field == "bots[a].api_key"));
    }

    #[test]
    fn test_realm_url_scheme() {
        let mut config = config_with(vec![echo("a")]);
        config.server.realm_url = "chat.example.com".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));

        config.server.realm_url = "https://".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_per_bot_realm_override_is_checked() {
        let mut bot = echo("a");
        bot.realm_url = Some("ftp://chat.example.com".into());
        assert!(matches!(
            validate_config(&config_with(vec![bot])),
            Err(ConfigError::InvalidUrl { url, .. }) if url == "ftp://chat.example.com"
        ));
    }

    #[test]
    fn test_missing_realm_without_override() {
        let mut config = config_with(vec![echo("a")]);
        config.server.realm_url.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "server.realm_url"
        ));
    }

    #[test]
    fn test_zero_intervals() {
        let mut bot = echo("a");
        bot.poll_interval_ms = 0;
        assert!(validate_config(&config_with(vec![bot])).is_err());

        let mut config = config_with(vec![]);
        config.server.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = RuntimeConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some("logs/bots.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
