//! Agent configuration loaded from environment variables.
//!
//! | Variable                        | Required | Default                     |
//! |---------------------------------|----------|-----------------------------|
//! | `HOMEASSISTANT_API_URL`         | yes      | --                          |
//! | `HOMEASSISTANT_API_TOKEN`       | yes      | --                          |
//! | `HOMEASSISTANT_ENTITY_ID`       | no       | discover by category        |
//! | `HOMEASSISTANT_ENTITY_CATEGORY` | no       | `person`                    |
//! | `HOMEASSISTANT_TIMEOUT`         | no       | none (seconds)              |
//! | `VERIFY_SSL`                    | no       | `true`                      |
//! | `KEEPALIVE_THRESHOLD`           | no       | `days=30,hours=0,minutes=0` |
//! | `MAX_CONCURRENT_REQUESTS`       | no       | `4`                         |
//! | `TELEGRAM_BOT_TOKEN`            | no       | --                          |
//! | `TELEGRAM_CHAT_ID`              | no       | --                          |
//! | `TELEGRAM_TIMEOUT`              | no       | `60`                        |

use std::time::Duration;

use watchdog_core::resolver::DEFAULT_CATEGORY;
use watchdog_core::scanner::DEFAULT_MAX_CONCURRENCY;
use watchdog_core::threshold::DEFAULT_THRESHOLD;
use watchdog_core::{ThresholdConfig, ThresholdParseError};
use watchdog_events::TelegramConfig;
use watchdog_homeassistant::HomeAssistantConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("KEEPALIVE_THRESHOLD: {0}")]
    Threshold(#[from] ThresholdParseError),
}

/// Everything one watchdog pass needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub homeassistant: HomeAssistantConfig,
    /// Explicit entity ids; `None` means discover by `category`.
    pub entity_ids: Option<Vec<String>>,
    pub category: String,
    pub threshold: ThresholdConfig,
    pub max_concurrency: usize,
    /// `None` disables alerting.
    pub telegram: Option<TelegramConfig>,
}

impl AgentConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = required(&lookup, "HOMEASSISTANT_API_URL")?;
        let token = required(&lookup, "HOMEASSISTANT_API_TOKEN")?;

        let verify_ssl = lookup("VERIFY_SSL")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let timeout = lookup("HOMEASSISTANT_TIMEOUT")
            .map(|v| parse_positive(&v, "HOMEASSISTANT_TIMEOUT"))
            .transpose()?
            .map(|secs| Duration::from_secs(secs as u64));

        let entity_ids = lookup("HOMEASSISTANT_ENTITY_ID").and_then(|raw| split_entity_ids(&raw));
        if entity_ids.is_none() {
            tracing::info!(
                "HOMEASSISTANT_ENTITY_ID is not set; will check all entities by category"
            );
        }

        let category = lookup("HOMEASSISTANT_ENTITY_CATEGORY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let threshold = ThresholdConfig::parse(
            &lookup("KEEPALIVE_THRESHOLD").unwrap_or_else(|| DEFAULT_THRESHOLD.to_string()),
        )?;

        if let Some(v) = lookup("TELEGRAM_TIMEOUT") {
            parse_positive(&v, "TELEGRAM_TIMEOUT")?;
        }

        let max_concurrency = match lookup("MAX_CONCURRENT_REQUESTS") {
            Some(v) => parse_positive(&v, "MAX_CONCURRENT_REQUESTS")?,
            None => DEFAULT_MAX_CONCURRENCY,
        };

        Ok(Self {
            homeassistant: HomeAssistantConfig {
                base_url,
                token,
                verify_ssl,
                timeout,
            },
            entity_ids,
            category,
            threshold,
            max_concurrency,
            telegram: TelegramConfig::from_lookup(&lookup),
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parse_positive(raw: &str, var: &'static str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be at least 1".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: format!("{raw:?} is not a positive integer ({e})"),
        }),
    }
}

/// Split a comma-separated id list, dropping blanks. An empty result
/// means "no explicit list".
fn split_entity_ids(raw: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    (!ids.is_empty()).then_some(ids)
}
