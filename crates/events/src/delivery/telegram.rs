//! Telegram alert delivery via the Bot API.
//!
//! [`TelegramDelivery`] sends each alert as a plain-text message with
//! `GET /bot<token>/sendMessage`. Configuration is loaded from
//! environment variables; if either the bot token or the chat id is
//! missing, [`TelegramConfig::from_env`] returns `None` and alerting is
//! disabled. Failed sends are not retried.

use std::time::Duration;

use async_trait::async_trait;

use watchdog_core::{AlertSink, DeliveryError};

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Default HTTP request timeout for a single send, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// TelegramConfig
// ---------------------------------------------------------------------------

/// Configuration for the Telegram alert channel.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
    /// Overridable for self-hosted Bot API servers.
    pub api_base: String,
}

impl TelegramConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable             | Required | Default |
    /// |----------------------|----------|---------|
    /// | `TELEGRAM_BOT_TOKEN` | yes      | —       |
    /// | `TELEGRAM_CHAT_ID`   | yes      | —       |
    /// | `TELEGRAM_TIMEOUT`   | no       | `60`    |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    ///
    /// A zero or unparsable `TELEGRAM_TIMEOUT` is logged and replaced by
    /// the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty())?;
        let chat_id = lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty())?;
        let timeout_secs = lookup("TELEGRAM_TIMEOUT")
            .map(|raw| parse_timeout(&raw))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(Self {
            bot_token,
            chat_id,
            timeout: Duration::from_secs(timeout_secs),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }
}

fn parse_timeout(raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            tracing::warn!(
                value = raw,
                default = DEFAULT_TIMEOUT_SECS,
                "TELEGRAM_TIMEOUT must be a positive integer; using default"
            );
            DEFAULT_TIMEOUT_SECS
        }
    }
}

// ---------------------------------------------------------------------------
// TelegramDelivery
// ---------------------------------------------------------------------------

/// Delivers alert messages to a Telegram chat.
pub struct TelegramDelivery {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramDelivery {
    /// Create a delivery service with a client bound to the configured
    /// timeout.
    pub fn new(config: TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    fn request(&self, message: &str) -> reqwest::RequestBuilder {
        self.client.get(self.send_message_url()).query(&[
            ("chat_id", self.config.chat_id.as_str()),
            ("text", message),
        ])
    }
}

#[async_trait]
impl AlertSink for TelegramDelivery {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .request(message)
            .send()
            .await
            // The URL embeds the bot token; keep it out of logs.
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Failed to send message to Telegram"
            );
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(chat_id = %self.config.chat_id, "Alert sent to Telegram");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
