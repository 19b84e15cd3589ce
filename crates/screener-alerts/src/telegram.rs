//! Telegram bot delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use screener_core::error::NotifyError;
use screener_core::traits::NotificationSink;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram bot configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl TelegramConfig {
    /// Create config directly with token and chat id.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Load token and chat id from the named environment variables.
    pub fn from_env(token_var: &str, chat_id_var: &str, api_base: &str) -> Result<Self, NotifyError> {
        let token = std::env::var(token_var)
            .map_err(|_| NotifyError::Configuration(format!("{} not set", token_var)))?;
        let chat_id = std::env::var(chat_id_var)
            .map_err(|_| NotifyError::Configuration(format!("{} not set", chat_id_var)))?;

        Ok(Self {
            token,
            chat_id,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts through the Telegram Bot API.
pub struct TelegramSink {
    config: TelegramConfig,
    client: Client,
}

impl TelegramSink {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.token.is_empty() || config.chat_id.is_empty() {
            return Err(NotifyError::Configuration(
                "Telegram token and chat id must be non-empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let resp = self
            .client
            .post(self.config.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::ApiError(format!("{}: {}", status, text)));
        }

        let data: TelegramResponse = resp
            .json()
            .await
            .map_err(|e| NotifyError::ApiError(e.to_string()))?;
        if !data.ok {
            return Err(NotifyError::ApiError(
                data.description.unwrap_or_else(|| "request rejected".into()),
            ));
        }

        debug!(chat_id = %self.config.chat_id, "Telegram message sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let config = TelegramConfig {
            api_base: "http://localhost:8081".into(),
            ..TelegramConfig::new("123:abc", "42")
        };
        assert_eq!(
            config.send_message_url(),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_missing_env_is_configuration_error() {
        let result = TelegramConfig::from_env(
            "SCREENER_TEST_UNSET_TOKEN",
            "SCREENER_TEST_UNSET_CHAT",
            DEFAULT_API_BASE,
        );
        assert!(matches!(result, Err(NotifyError::Configuration(_))));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(TelegramSink::new(TelegramConfig::new("", "42")).is_err());
        assert!(TelegramSink::new(TelegramConfig::new("123:abc", "42")).is_ok());
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendMessageRequest {
            chat_id: "42",
            text: "*hi*",
            parse_mode: "Markdown",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["parse_mode"], "Markdown");
    }
}
