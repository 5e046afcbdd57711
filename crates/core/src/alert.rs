//! Alert sink interface and stale-entity message composition.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::error::DeliveryError;
use crate::humanize::format_duration;
use crate::types::EntityRef;

/// Operator-facing notification channel.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one message. Implementations do not retry.
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;

    /// `false` for sinks that drop everything. The checker skips `send`
    /// entirely when this is `false`.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Sink used when alerting is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSink;

#[async_trait]
impl AlertSink for DisabledSink {
    async fn send(&self, _message: &str) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Build the alert text for an entity that exceeded its threshold.
pub fn stale_message(
    entity: &EntityRef,
    staleness: TimeDelta,
    last_updated: DateTime<Utc>,
    threshold: TimeDelta,
) -> String {
    format!(
        "{} has not sent any updates for {}. Last update was on {}, which exceeds the threshold of {}.",
        entity.slug(),
        format_duration(staleness),
        last_updated,
        format_duration(threshold),
    )
}
