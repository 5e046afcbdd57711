//! Alert delivery for the entity watchdog.
//!
//! - [`delivery::telegram`] — Telegram Bot API channel.
//! - [`alert_sink_from_config`] — picks the Telegram channel when it is
//!   configured, or a [`DisabledSink`] otherwise.

use std::sync::Arc;

use watchdog_core::{AlertSink, DisabledSink};

pub mod delivery;

pub use delivery::telegram::{TelegramConfig, TelegramDelivery};

/// Build the alert sink for this run.
///
/// Missing configuration silently disables alerting. A client that
/// cannot be constructed is logged and also disables alerting, since
/// alert delivery is never fatal to a scan.
pub fn alert_sink_from_config(config: Option<TelegramConfig>) -> Arc<dyn AlertSink> {
    let Some(config) = config else {
        tracing::info!("Telegram not configured; alerting disabled");
        return Arc::new(DisabledSink);
    };

    match TelegramDelivery::new(config) {
        Ok(delivery) => {
            tracing::info!("Telegram alerting enabled");
            Arc::new(delivery)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Telegram client; alerting disabled");
            Arc::new(DisabledSink)
        }
    }
}
