//! Bot base configuration: token, Redis URL, optional Bot API URL, webhook URL and log file.
//! Loaded from the environment: BOT_TOKEN, REDIS_URL, TELEGRAM_API_URL (or TELOXIDE_API_URL),
//! WEBHOOK_URL, LOG_FILE.

use dbot_core::{BotCredential, DbotError, LogConfig, Result};
use std::env;
use storage::DEFAULT_REDIS_URL;

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN; also the store key namespace.
    pub bot_token: BotCredential,
    /// REDIS_URL, defaults to [`DEFAULT_REDIS_URL`].
    pub redis_url: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// WEBHOOK_URL; only reported in the status record.
    pub webhook_url: Option<String>,
    /// LOG_FILE; console only when unset.
    pub log_file: Option<String>,
}

impl BotConfig {
    /// Loads from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN")
                .map_err(|_| DbotError::Config("BOT_TOKEN not set".to_string()))?,
        };
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let webhook_url = env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        let log_file = env::var("LOG_FILE").ok().filter(|s| !s.is_empty());

        Ok(Self {
            bot_token: BotCredential::new(bot_token),
            redis_url,
            telegram_api_url,
            webhook_url,
            log_file,
        })
    }

    /// Config with the given token and defaults for everything else.
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: BotCredential::new(bot_token),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            telegram_api_url: None,
            webhook_url: None,
            log_file: None,
        }
    }

    /// Rejects an empty token and an unparsable API URL.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            return Err(DbotError::Config("BOT_TOKEN is empty".to_string()));
        }
        self.api_url()?;
        Ok(())
    }

    /// Parsed TELEGRAM_API_URL, if set.
    pub fn api_url(&self) -> Result<Option<reqwest::Url>> {
        self.telegram_api_url
            .as_deref()
            .map(|url_str| {
                reqwest::Url::parse(url_str).map_err(|e| {
                    DbotError::Config(format!(
                        "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {} ({})",
                        url_str, e
                    ))
                })
            })
            .transpose()
    }

    pub fn log_config(&self) -> LogConfig {
        match &self.log_file {
            Some(path) => LogConfig::with_log_file(path),
            None => LogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "BOT_TOKEN",
            "REDIS_URL",
            "TELEGRAM_API_URL",
            "TELOXIDE_API_URL",
            "WEBHOOK_URL",
            "LOG_FILE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_with_token() {
        let config = BotConfig::with_token("test_token");
        assert_eq!(config.bot_token.as_str(), "test_token");
        assert_eq!(config.redis_url, "redis://localhost:6379/0");
        assert!(config.telegram_api_url.is_none());
        assert!(config.webhook_url.is_none());
        assert!(config.log_file.is_none());
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");

        let config = BotConfig::load(None).unwrap();

        assert_eq!(config.bot_token.as_str(), "env_token");
        assert_eq!(config.redis_url, DEFAULT_REDIS_URL);
        assert!(config.telegram_api_url.is_none());
        assert!(config.webhook_url.is_none());
        assert_eq!(config.log_config(), LogConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");
        env::set_var("REDIS_URL", "redis://cache:6380/2");
        env::set_var("TELOXIDE_API_URL", "http://localhost:8081");
        env::set_var("WEBHOOK_URL", "https://example.com/hook");
        env::set_var("LOG_FILE", "logs/echo.log");

        let config = BotConfig::load(Some("cli_token".to_string())).unwrap();

        assert_eq!(config.bot_token.as_str(), "cli_token");
        assert_eq!(config.redis_url, "redis://cache:6380/2");
        assert_eq!(
            config.telegram_api_url.as_deref(),
            Some("http://localhost:8081")
        );
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://example.com/hook")
        );
        assert_eq!(
            config.log_config().log_file,
            Some(std::path::PathBuf::from("logs/echo.log"))
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_config_without_token_fails() {
        clear_env();
        let err = BotConfig::load(None).unwrap_err();
        assert!(matches!(err, DbotError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = BotConfig::with_token("");
        assert!(matches!(config.validate(), Err(DbotError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_invalid_api_url() {
        let mut config = BotConfig::with_token("t");
        config.telegram_api_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(DbotError::Config(_))));
    }
}
