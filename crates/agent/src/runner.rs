//! One watchdog pass: resolve entities, then scan them.

use std::sync::Arc;

use watchdog_core::{
    resolver, AlertSink, BoundedScanner, ResolutionError, ScanError, ScanResult, StateProvider,
};
use watchdog_events::alert_sink_from_config;
use watchdog_homeassistant::{HomeAssistantApi, HomeAssistantApiError};

use crate::config::AgentConfig;

/// Fatal run errors. Configuration errors are reported before a run
/// starts; any of these aborts the run with no partial scan.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Failed to build Home Assistant client: {0}")]
    Client(#[from] HomeAssistantApiError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Build the Home Assistant provider and alert sink from `config` and
/// run a single pass.
pub async fn run(config: &AgentConfig) -> Result<ScanResult, AgentError> {
    let provider: Arc<dyn StateProvider> =
        Arc::new(HomeAssistantApi::new(config.homeassistant.clone())?);
    let sink = alert_sink_from_config(config.telegram.clone());

    run_with(config, provider, sink).await
}

/// Run a single pass against explicit collaborators.
///
/// The concurrency cap is validated before the provider is contacted.
pub async fn run_with(
    config: &AgentConfig,
    provider: Arc<dyn StateProvider>,
    sink: Arc<dyn AlertSink>,
) -> Result<ScanResult, AgentError> {
    tracing::info!(threshold = %config.threshold, "Keepalive threshold");

    let scanner = BoundedScanner::new(
        Arc::clone(&provider),
        sink,
        config.threshold.duration(),
        config.max_concurrency,
    )?;

    let resolution = resolver::resolve(
        config.entity_ids.as_deref(),
        provider.as_ref(),
        &config.category,
    )
    .await?;

    if resolution.is_empty() {
        tracing::info!("No entities to check");
        return Ok(ScanResult {
            checked: 0,
            outcomes: Vec::new(),
        });
    }

    let entities = resolution.into_entities();
    tracing::info!(
        entities = ?entities.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
        "Checking entities",
    );

    let result = scanner.scan(entities).await;
    let summary = result.summary();

    tracing::info!(
        checked = result.checked,
        fresh = summary.fresh,
        stale = summary.stale,
        not_found = summary.not_found,
        unknown = summary.unknown,
        "Scan complete",
    );

    Ok(result)
}
