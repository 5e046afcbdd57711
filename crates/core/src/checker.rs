//! Single-entity liveness check.
//!
//! [`check`] fetches one entity, compares its last update against the
//! threshold and, when stale, submits an alert. It never fails: every
//! error path is folded into a [`CheckOutcome`] so a single bad entity
//! cannot abort the surrounding scan.

use chrono::{DateTime, TimeDelta, Utc};

use crate::alert::{stale_message, AlertSink};
use crate::error::ProviderError;
use crate::provider::StateProvider;
use crate::types::EntityRef;

/// Reason attached to [`CheckOutcome::Unknown`] when the provider has no
/// timestamp for an existing entity.
pub const NO_LAST_UPDATE: &str = "no last-update recorded";

/// Result of checking one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Fresh,
    Stale { staleness: TimeDelta },
    NotFound,
    Unknown { error: String },
}

impl CheckOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Pure threshold evaluation. `staleness == threshold` counts as fresh.
pub fn evaluate(
    last_updated: DateTime<Utc>,
    threshold: TimeDelta,
    now: DateTime<Utc>,
) -> CheckOutcome {
    let staleness = now - last_updated;
    if staleness <= threshold {
        CheckOutcome::Fresh
    } else {
        CheckOutcome::Stale { staleness }
    }
}

/// Check one entity against `threshold` as of `now`.
///
/// Alerts are sent at most once, and only when the outcome is
/// [`CheckOutcome::Stale`] and `sink` is enabled. A delivery failure is
/// logged; it does not change the outcome.
pub async fn check(
    provider: &dyn StateProvider,
    sink: &dyn AlertSink,
    id: &EntityRef,
    threshold: TimeDelta,
    now: DateTime<Utc>,
) -> CheckOutcome {
    let state = match provider.get_entity(id).await {
        Ok(state) => state,
        Err(ProviderError::NotFound(_)) => {
            tracing::error!(entity_id = %id, "Entity not found");
            return CheckOutcome::NotFound;
        }
        Err(e) => {
            tracing::error!(entity_id = %id, error = %e, "Error checking entity");
            return CheckOutcome::Unknown {
                error: e.to_string(),
            };
        }
    };

    let Some(last_updated) = state.last_updated else {
        tracing::error!(entity_id = %id, "Error checking entity: {NO_LAST_UPDATE}");
        return CheckOutcome::Unknown {
            error: NO_LAST_UPDATE.to_string(),
        };
    };

    let outcome = evaluate(last_updated, threshold, now);

    tracing::info!(
        entity_id = %id,
        current_time = %now,
        last_update = %last_updated,
        within_threshold = !outcome.is_stale(),
        "Checked entity",
    );

    if let CheckOutcome::Stale { staleness } = outcome {
        let message = stale_message(id, staleness, last_updated, threshold);
        tracing::error!(entity_id = %id, "{message}");

        if sink.is_enabled() {
            if let Err(e) = sink.send(&message).await {
                tracing::error!(entity_id = %id, error = %e, "Failed to deliver alert");
            }
        }
    }

    outcome
}
