use std::net::SocketAddr;

use thiserror::Error;
use tracing::Level;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),

    #[error("{name} can't be parsed from '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("webhook mode needs both NGROK_URL and NGROK_ADDR")]
    IncompleteWebhook,
}

/// Where Telegram should deliver updates in webhook mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub teloxide_token: String,
    pub database_url: String,
    pub log_level: Level,
    /// Polling is used when this is `None`.
    pub webhook: Option<WebhookConfig>,
    pub admin_name: Option<String>,
}

impl Config {
    /// Reads the configuration from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let log_level = match get("LOG_LEVEL") {
            Some(value) => value.parse::<Level>().map_err(|err| ConfigError::Invalid {
                name: "LOG_LEVEL",
                reason: err.to_string(),
                value,
            })?,
            None => Level::ERROR,
        };

        let webhook = match (get("NGROK_URL"), get("NGROK_ADDR")) {
            (Some(url), Some(addr)) => Some(WebhookConfig {
                url: url.parse().map_err(|err: url::ParseError| ConfigError::Invalid {
                    name: "NGROK_URL",
                    reason: err.to_string(),
                    value: url.clone(),
                })?,
                addr: addr
                    .parse()
                    .map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
                        name: "NGROK_ADDR",
                        reason: err.to_string(),
                        value: addr.clone(),
                    })?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteWebhook),
        };

        Ok(Self {
            teloxide_token: require("TELOXIDE_TOKEN")?,
            database_url: require("DATABASE_URL")?,
            log_level,
            webhook,
            admin_name: get("ADMIN_NAME"),
        })
    }

    /// Only the admin may author or delete questions.
    pub fn is_admin(&self, username: Option<&str>) -> bool {
        match (self.admin_name.as_deref(), username) {
            (Some(admin), Some(username)) => admin == username,
            _ => false,
        }
    }
}
