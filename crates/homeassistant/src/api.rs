//! REST API client for the Home Assistant state endpoints.
//!
//! Wraps `GET /api/states` and `GET /api/states/<entity_id>` using
//! [`reqwest`], and implements [`StateProvider`] on top of them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use watchdog_core::{EntityCatalog, EntityRef, EntityState, ProviderError, StateProvider};

use crate::messages::{group_by_domain, StateObject};

/// Connection settings for one Home Assistant instance.
#[derive(Debug, Clone)]
pub struct HomeAssistantConfig {
    /// Base URL, e.g. `https://hass.local:8123` (a trailing `/api` is accepted).
    pub base_url: String,
    /// Long-lived access token.
    pub token: String,
    pub verify_ssl: bool,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// Errors from the Home Assistant REST layer.
#[derive(Debug, thiserror::Error)]
pub enum HomeAssistantApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured base URL cannot carry a path.
    #[error("Invalid Home Assistant URL: {0}")]
    InvalidUrl(String),

    /// `404` for a single-entity lookup.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Home Assistant returned a non-2xx status code.
    #[error("Home Assistant API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl From<HomeAssistantApiError> for ProviderError {
    fn from(err: HomeAssistantApiError) -> Self {
        match err {
            HomeAssistantApiError::NotFound(id) => ProviderError::NotFound(id),
            HomeAssistantApiError::Request(e) if e.is_decode() => {
                ProviderError::Protocol(e.to_string())
            }
            HomeAssistantApiError::Request(e) => ProviderError::Transport(e.to_string()),
            err @ HomeAssistantApiError::InvalidUrl(_) => ProviderError::Transport(err.to_string()),
            err @ HomeAssistantApiError::ApiError { .. } => {
                ProviderError::Protocol(err.to_string())
            }
        }
    }
}

/// HTTP client for a single Home Assistant instance.
pub struct HomeAssistantApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl HomeAssistantApi {
    /// Build the client. Fails only if the TLS backend cannot be
    /// initialised.
    pub fn new(config: HomeAssistantConfig) -> Result<Self, HomeAssistantApiError> {
        if !config.verify_ssl {
            tracing::warn!(url = %config.base_url, "TLS certificate verification is disabled");
        }

        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_ssl);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, &config.base_url, config.token))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            api_url: normalize_api_url(base_url),
            token,
        }
    }

    /// Base URL requests are issued against, always ending in `/api`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `GET /api/states/<entity_id>`.
    pub async fn get_state(&self, entity_id: &str) -> Result<StateObject, HomeAssistantApiError> {
        let response = self
            .client
            .get(self.state_url(entity_id)?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(HomeAssistantApiError::NotFound(entity_id.to_string()));
        }

        Self::parse_response(response).await
    }

    /// `GET /api/states`.
    pub async fn get_states(&self) -> Result<Vec<StateObject>, HomeAssistantApiError> {
        let response = self
            .client
            .get(format!("{}/states", self.api_url))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// The entity id is pushed as a single, percent-encoded path segment.
    fn state_url(&self, entity_id: &str) -> Result<reqwest::Url, HomeAssistantApiError> {
        let invalid = || HomeAssistantApiError::InvalidUrl(self.api_url.clone());
        let mut url = reqwest::Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .push("states")
            .push(entity_id);
        Ok(url)
    }

    // ---- private helpers ----

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HomeAssistantApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HomeAssistantApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl StateProvider for HomeAssistantApi {
    async fn get_entity(&self, id: &EntityRef) -> Result<EntityState, ProviderError> {
        let state = self.get_state(id.as_str()).await?;
        tracing::debug!(entity_id = %id, state = ?state.state, "Fetched entity state");
        Ok(state.into_entity_state())
    }

    async fn list_entities(&self) -> Result<EntityCatalog, ProviderError> {
        let states = self.get_states().await?;
        tracing::debug!(count = states.len(), "Fetched entity states");
        Ok(group_by_domain(states))
    }
}

/// Strip trailing slashes and a trailing `/api`, then append `/api`.
fn normalize_api_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    let root = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    format!("{root}/api")
}
