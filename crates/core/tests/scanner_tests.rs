//! Integration tests for the bounded scanner.
//!
//! Drives [`BoundedScanner`] against instrumented in-memory providers to
//! verify the concurrency cap, per-entity failure isolation, input-order
//! reassembly and alert counts.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use watchdog_core::{
    AlertSink, BoundedScanner, CheckOutcome, DeliveryError, DisabledSink, EntityCatalog,
    EntityRef, EntityState, ProviderError, StateProvider,
};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Provider that records the peak number of concurrent `get_entity` calls.
///
/// Each entity `e<N>` was last updated `N` days ago. Ids listed in
/// `failing` return a transport error; ids in `panicking` panic.
#[derive(Default)]
struct InstrumentedProvider {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    delay: Duration,
    failing: HashSet<String>,
    panicking: HashSet<String>,
}

impl InstrumentedProvider {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

#[async_trait]
impl StateProvider for InstrumentedProvider {
    async fn get_entity(&self, id: &EntityRef) -> Result<EntityState, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_in_flight, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(id.as_str()) {
            panic!("provider blew up on {id}");
        }
        if self.failing.contains(id.as_str()) {
            return Err(ProviderError::Transport("connection reset".into()));
        }

        let days_ago: i64 = id.as_str().trim_start_matches('e').parse().unwrap_or(0);
        Ok(EntityState {
            id: id.clone(),
            last_updated: Some(Utc::now() - TimeDelta::days(days_ago)),
        })
    }

    async fn list_entities(&self) -> Result<EntityCatalog, ProviderError> {
        Ok(EntityCatalog::new())
    }
}

/// Sink that records every message it is asked to deliver.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<String>>,
    enabled: bool,
}

impl RecordingSink {
    fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    fn disabled() -> Self {
        Self::default()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn entities(n: usize) -> Vec<EntityRef> {
    (0..n).map(|i| EntityRef::new(format!("e{i}"))).collect()
}

// ---------------------------------------------------------------------------
// Test: concurrency cap
// ---------------------------------------------------------------------------

/// Scanning 20 entities with a cap of 4 never has more than 4 provider
/// calls in flight, and every entity is still checked.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn never_exceeds_max_concurrency() {
    let provider = Arc::new(InstrumentedProvider::with_delay(Duration::from_millis(20)));
    let scanner = BoundedScanner::new(
        provider.clone(),
        Arc::new(DisabledSink),
        TimeDelta::days(30),
        4,
    )
    .unwrap();

    let result = scanner.scan(entities(20)).await;

    assert_eq!(result.checked, 20);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 20);
    let peak = provider.peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak in-flight was {peak}, cap is 4");
    assert!(peak >= 1);
}

/// A cap of one serialises all provider calls.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cap_of_one_serialises_calls() {
    let provider = Arc::new(InstrumentedProvider::with_delay(Duration::from_millis(5)));
    let scanner =
        BoundedScanner::new(provider.clone(), Arc::new(DisabledSink), TimeDelta::days(30), 1)
            .unwrap();

    scanner.scan(entities(6)).await;

    assert_eq!(provider.peak.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Test: failure isolation
// ---------------------------------------------------------------------------

/// A transport error on entity #7 of 10 leaves the other nine unaffected.
#[tokio::test]
async fn transport_error_is_isolated_to_one_entity() {
    let provider = Arc::new(InstrumentedProvider {
        failing: HashSet::from(["e6".to_string()]),
        ..Default::default()
    });
    let scanner =
        BoundedScanner::new(provider, Arc::new(DisabledSink), TimeDelta::days(30), 3).unwrap();

    let result = scanner.scan(entities(10)).await;

    assert_eq!(result.checked, 10);
    for (i, (id, outcome)) in result.outcomes.iter().enumerate() {
        if i == 6 {
            assert_matches!(
                outcome,
                CheckOutcome::Unknown { error } if error.contains("connection reset")
            );
        } else {
            assert_eq!(outcome, &CheckOutcome::Fresh, "{id} should be fresh");
        }
    }
}

/// A panicking check is reported as `Unknown` and releases its slot;
/// with a cap of one, later entities would otherwise never run.
#[tokio::test]
async fn panicking_check_does_not_stall_the_scan() {
    let provider = Arc::new(InstrumentedProvider {
        panicking: HashSet::from(["e1".to_string()]),
        ..Default::default()
    });
    let scanner =
        BoundedScanner::new(provider, Arc::new(DisabledSink), TimeDelta::days(30), 1).unwrap();

    let result = scanner.scan(entities(4)).await;

    assert_eq!(result.checked, 4);
    assert_matches!(
        &result.outcomes[1].1,
        CheckOutcome::Unknown { error } if error.contains("check task failed")
    );
    assert_eq!(result.summary().fresh, 3);
}

// ---------------------------------------------------------------------------
// Test: ordering
// ---------------------------------------------------------------------------

/// Results follow input order even when later entities finish first.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_preserve_input_order() {
    struct ReverseDelay;

    #[async_trait]
    impl StateProvider for ReverseDelay {
        async fn get_entity(&self, id: &EntityRef) -> Result<EntityState, ProviderError> {
            let idx: u64 = id.as_str().trim_start_matches('e').parse().unwrap();
            tokio::time::sleep(Duration::from_millis(50 - idx * 10)).await;
            Ok(EntityState {
                id: id.clone(),
                last_updated: Some(Utc::now()),
            })
        }

        async fn list_entities(&self) -> Result<EntityCatalog, ProviderError> {
            Ok(EntityCatalog::new())
        }
    }

    let scanner = BoundedScanner::new(
        Arc::new(ReverseDelay),
        Arc::new(DisabledSink),
        TimeDelta::days(1),
        5,
    )
    .unwrap();

    let input = entities(5);
    let result = scanner.scan(input.clone()).await;

    let order: Vec<EntityRef> = result.outcomes.into_iter().map(|(id, _)| id).collect();
    assert_eq!(order, input);
}

// ---------------------------------------------------------------------------
// Test: alerts
// ---------------------------------------------------------------------------

/// Stale entities trigger exactly one alert each; fresh ones none.
#[tokio::test]
async fn one_alert_per_stale_entity() {
    // e0..e39: entities e31..e39 are older than the 30-day threshold.
    let provider = Arc::new(InstrumentedProvider::default());
    let sink = Arc::new(RecordingSink::enabled());
    let scanner = BoundedScanner::new(provider, sink.clone(), TimeDelta::days(30), 4).unwrap();

    let result = scanner.scan(entities(40)).await;

    let summary = result.summary();
    assert_eq!(summary.stale, 9);
    assert_eq!(summary.fresh, 31);
    assert_eq!(sink.count(), 9);
}

/// With alerting disabled, stale entities are still reported but the
/// sink is never called.
#[tokio::test]
async fn disabled_sink_receives_no_alerts() {
    let provider = Arc::new(InstrumentedProvider::default());
    let sink = Arc::new(RecordingSink::disabled());
    let scanner = BoundedScanner::new(provider, sink.clone(), TimeDelta::days(30), 4).unwrap();

    let result = scanner.scan(entities(40)).await;

    assert_eq!(result.summary().stale, 9);
    assert_eq!(sink.count(), 0);
}
