//! Telegram Bot API client.
//!
//! Only `sendMessage` is needed: inbound updates arrive on the webhook.
//! The bot token is part of every request URL, so it is held as a
//! [`SecretString`] and the client does not derive `Debug`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use chatline_types::config::TelegramConfig;
use chatline_types::telegram::{ApiResult, SendMessage};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Bot API.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

pub struct TelegramClient {
    client: reqwest::Client,
    token: SecretString,
    api_base: String,
    parse_mode: Option<String>,
}

impl TelegramClient {
    pub fn new(token: SecretString, config: &TelegramConfig) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TelegramError::Http(e.to_string()))?;

        Ok(Self {
            client,
            token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            parse_mode: config.parse_mode.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token.expose_secret())
    }

    /// Send `text` to `chat_id`.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
        };

        // reqwest errors can carry the URL, and with it the token.
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Http(e.without_url().to_string()))?;

        let status = response.status();
        let result: ApiResult = response
            .json()
            .await
            .map_err(|e| TelegramError::Http(format!("HTTP {status}: {}", e.without_url())))?;

        if !result.ok {
            return Err(TelegramError::Api {
                code: result.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: result.description.unwrap_or_default(),
            });
        }

        tracing::debug!(chat_id, "Message delivered");
        Ok(())
    }
}
