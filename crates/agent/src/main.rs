//! `watchdog-agent` -- one-shot entity liveness check.
//!
//! Resolves the entities to watch on a Home Assistant instance, checks
//! that each one has reported within `KEEPALIVE_THRESHOLD`, and sends a
//! Telegram alert for every stale entity. Exits `0` after a full pass
//! and `1` on any fatal error. See [`watchdog_agent::config`] for the
//! environment variables.
//!
//! Logging goes to the console only by default; there is no default log
//! file. `SYSLOG_FILE`, when set, mirrors the console log into that file.

use std::path::PathBuf;

use watchdog_agent::config::AgentConfig;
use watchdog_agent::{logging, runner};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let log_file = std::env::var("SYSLOG_FILE").ok().map(PathBuf::from);
    if let Err(e) = logging::init(log_file.as_deref()) {
        eprintln!("Failed to open log file {log_file:?}: {e}");
        std::process::exit(1);
    }

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        url = %config.homeassistant.base_url,
        max_concurrency = config.max_concurrency,
        alerting = config.telegram.is_some(),
        "Starting watchdog-agent",
    );

    if let Err(e) = runner::run(&config).await {
        tracing::error!(error = %e, "Watchdog run failed");
        std::process::exit(1);
    }
}
