//! Entity liveness checking engine.
//!
//! - [`ThresholdConfig`] parses the freshness window.
//! - [`resolver::resolve`] picks the entities to check.
//! - [`checker::check`] evaluates one entity and alerts when stale.
//! - [`BoundedScanner`] fans checks out under a concurrency cap.
//!
//! The state backend and the alert channel are consumed through the
//! [`StateProvider`] and [`AlertSink`] traits.

pub mod alert;
pub mod checker;
pub mod error;
pub mod humanize;
pub mod provider;
pub mod resolver;
pub mod scanner;
pub mod threshold;
pub mod types;

pub use alert::{AlertSink, DisabledSink};
pub use checker::CheckOutcome;
pub use error::{DeliveryError, ProviderError, ResolutionError, ScanError};
pub use provider::{EntityCatalog, StateProvider};
pub use resolver::Resolution;
pub use scanner::{BoundedScanner, ScanResult, ScanSummary};
pub use threshold::{ThresholdConfig, ThresholdParseError};
pub use types::{EntityRef, EntityState};
