//! Bounded-concurrency scan over a resolved entity set.
//!
//! One task is spawned per entity. A [`Semaphore`] with
//! `max_concurrency` permits gates the provider calls: a task holds its
//! permit from before the fetch until it finishes (alert included), and
//! drops it on every exit path. Results are reassembled in input order
//! regardless of completion order.
//!
//! There is no scan-level deadline; a provider call that never resolves
//! blocks the scan. Per-call timeouts belong to the provider client.

use std::fmt;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::alert::AlertSink;
use crate::checker::{check, CheckOutcome};
use crate::error::ScanError;
use crate::provider::StateProvider;
use crate::types::EntityRef;

/// Default number of in-flight provider requests.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Outcome of one scan pass, in the order the entities were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub checked: usize,
    pub outcomes: Vec<(EntityRef, CheckOutcome)>,
}

/// Per-outcome tally of a [`ScanResult`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub fresh: usize,
    pub stale: usize,
    pub not_found: usize,
    pub unknown: usize,
}

impl ScanResult {
    pub fn summary(&self) -> ScanSummary {
        self.outcomes
            .iter()
            .fold(ScanSummary::default(), |mut acc, (_, outcome)| {
                match outcome {
                    CheckOutcome::Fresh => acc.fresh += 1,
                    CheckOutcome::Stale { .. } => acc.stale += 1,
                    CheckOutcome::NotFound => acc.not_found += 1,
                    CheckOutcome::Unknown { .. } => acc.unknown += 1,
                }
                acc
            })
    }
}

/// Runs liveness checks for many entities with at most
/// `max_concurrency` provider calls in flight.
pub struct BoundedScanner {
    provider: Arc<dyn StateProvider>,
    sink: Arc<dyn AlertSink>,
    threshold: TimeDelta,
    max_concurrency: usize,
}

impl fmt::Debug for BoundedScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedScanner")
            .field("threshold", &self.threshold)
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

impl BoundedScanner {
    /// Rejects `max_concurrency == 0` before any work is scheduled.
    pub fn new(
        provider: Arc<dyn StateProvider>,
        sink: Arc<dyn AlertSink>,
        threshold: TimeDelta,
        max_concurrency: usize,
    ) -> Result<Self, ScanError> {
        if max_concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(max_concurrency));
        }
        Ok(Self {
            provider,
            sink,
            threshold,
            max_concurrency,
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Check every entity and wait for all of them.
    ///
    /// Never returns early: a failing or panicking check only affects
    /// its own entry, which becomes [`CheckOutcome::Unknown`].
    pub async fn scan(&self, ids: Vec<EntityRef>) -> ScanResult {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        tracing::info!(
            count = ids.len(),
            max_concurrency = self.max_concurrency,
            "Starting scan",
        );

        let handles: Vec<(EntityRef, JoinHandle<CheckOutcome>)> = ids
            .into_iter()
            .map(|id| {
                let handle = tokio::spawn(check_with_permit(
                    Arc::clone(&semaphore),
                    Arc::clone(&self.provider),
                    Arc::clone(&self.sink),
                    id.clone(),
                    self.threshold,
                ));
                (id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(entity_id = %id, error = %e, "Check task failed");
                    CheckOutcome::Unknown {
                        error: format!("check task failed: {e}"),
                    }
                }
            };
            outcomes.push((id, outcome));
        }

        ScanResult {
            checked: outcomes.len(),
            outcomes,
        }
    }
}

/// Acquire an admission slot, then run the check. The permit is dropped
/// when this future completes, whatever the outcome.
async fn check_with_permit(
    semaphore: Arc<Semaphore>,
    provider: Arc<dyn StateProvider>,
    sink: Arc<dyn AlertSink>,
    id: EntityRef,
    threshold: TimeDelta,
) -> CheckOutcome {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            return CheckOutcome::Unknown {
                error: format!("admission gate closed: {e}"),
            };
        }
    };

    check(provider.as_ref(), sink.as_ref(), &id, threshold, Utc::now()).await
}

/// Convenience wrapper: validate the cap and run one scan pass.
pub async fn scan(
    ids: Vec<EntityRef>,
    provider: Arc<dyn StateProvider>,
    sink: Arc<dyn AlertSink>,
    threshold: TimeDelta,
    max_concurrency: usize,
) -> Result<ScanResult, ScanError> {
    let scanner = BoundedScanner::new(provider, sink, threshold, max_concurrency)?;
    Ok(scanner.scan(ids).await)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::alert::DisabledSink;
    use crate::error::ProviderError;
    use crate::provider::EntityCatalog;
    use crate::types::EntityState;

    struct EmptyProvider;

    #[async_trait::async_trait]
    impl StateProvider for EmptyProvider {
        async fn get_entity(&self, id: &EntityRef) -> Result<EntityState, ProviderError> {
            Err(ProviderError::NotFound(id.to_string()))
        }

        async fn list_entities(&self) -> Result<EntityCatalog, ProviderError> {
            Ok(EntityCatalog::new())
        }
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let result = BoundedScanner::new(
            Arc::new(EmptyProvider),
            Arc::new(DisabledSink),
            TimeDelta::days(1),
            0,
        );
        assert_matches!(result, Err(ScanError::InvalidConcurrency(0)));
    }

    #[test]
    fn debug_output_shows_limits() {
        let scanner = BoundedScanner::new(
            Arc::new(EmptyProvider),
            Arc::new(DisabledSink),
            TimeDelta::days(1),
            3,
        )
        .unwrap();
        let rendered = format!("{scanner:?}");
        assert!(rendered.starts_with("BoundedScanner"));
        assert!(rendered.contains("max_concurrency: 3"));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_result() {
        let result = scan(
            Vec::new(),
            Arc::new(EmptyProvider),
            Arc::new(DisabledSink),
            TimeDelta::days(1),
            DEFAULT_MAX_CONCURRENCY,
        )
        .await
        .unwrap();
        assert_eq!(result.checked, 0);
        assert!(result.outcomes.is_empty());
    }

    #[test]
    fn summary_counts_each_outcome() {
        let result = ScanResult {
            checked: 5,
            outcomes: vec![
                (EntityRef::new("a"), CheckOutcome::Fresh),
                (EntityRef::new("b"), CheckOutcome::Fresh),
                (
                    EntityRef::new("c"),
                    CheckOutcome::Stale {
                        staleness: TimeDelta::days(2),
                    },
                ),
                (EntityRef::new("d"), CheckOutcome::NotFound),
                (
                    EntityRef::new("e"),
                    CheckOutcome::Unknown {
                        error: "boom".into(),
                    },
                ),
            ],
        };
        assert_eq!(
            result.summary(),
            ScanSummary {
                fresh: 2,
                stale: 1,
                not_found: 1,
                unknown: 1,
            }
        );
    }
}
