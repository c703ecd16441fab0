use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration build error: {0}")]
    Build(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Settings for the outbound Telegram Bot API call.
#[derive(Clone, Debug, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Render mode sent as `parse_mode`.
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            parse_mode: default_parse_mode(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: u64,
    #[serde(default = "default_history_max_limit")]
    pub max_limit: u64,
    /// When set, `/history` items carry the raw provider response.
    #[serde(default)]
    pub expose_api_response: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
            max_limit: default_history_max_limit(),
            expose_api_response: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Bot credential. Not checked at start-up; an empty token surfaces as a
    /// provider error on the first send.
    #[serde(default)]
    pub bot_token: String,
    /// Default target used when a request carries no `chat_id`.
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            database_url: default_database_url(),
            bind_address: default_bind_address(),
            telegram: TelegramConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "telegram.timeout_secs must be > 0".into(),
            ));
        }
        if self.history.default_limit == 0 {
            return Err(ConfigError::Validation(
                "history.default_limit must be > 0".into(),
            ));
        }
        if self.history.max_limit < self.history.default_limit {
            return Err(ConfigError::Validation(
                "history.max_limit must be >= history.default_limit".into(),
            ));
        }
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "bind_address is not a socket address: {}",
                self.bind_address
            )));
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_parse_mode() -> String {
    "Markdown".into()
}

fn default_history_limit() -> u64 {
    20
}

fn default_history_max_limit() -> u64 {
    1000
}

fn default_database_url() -> String {
    "sqlite:///app/data/history.db?mode=rwc".into()
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".into()
}

/// Load application configuration from an optional `config.yaml` + environment overrides.
///
/// Environment variables are read without a prefix, so the deployment-level
/// `BOT_TOKEN` and `CHAT_ID` map straight onto `bot_token` and `chat_id`.
/// Nested keys use double underscores (e.g. `TELEGRAM__TIMEOUT_SECS`).
///
/// Returns a `ConfigError` instead of panicking so the caller can decide how to fail.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};
    let cfg = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(Environment::default().separator("__"))
        .build()?;

    let app: AppConfig = cfg.try_deserialize()?;
    app.validate()?;

    Ok(app)
}

/// Convenience helper for binaries wanting panic-on-error behaviour.
pub fn load_config_or_panic() -> AppConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => panic!("Failed to load configuration: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.history.default_limit, 20);
        assert_eq!(cfg.telegram.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.telegram.parse_mode, "Markdown");
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cfg = AppConfig::default();
        cfg.telegram.timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_max_below_default() {
        let mut cfg = AppConfig::default();
        cfg.history.max_limit = 5;
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_bad_bind_address() {
        let cfg = AppConfig {
            bind_address: "localhost".into(),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
