//! Entity identifiers and fetched entity state.

use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque identifier assigned by the state provider, e.g. `person.alice`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub id: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Category prefix before the first `.` (`person` for `person.alice`).
    pub fn domain(&self) -> Option<&str> {
        self.id.split_once('.').map(|(domain, _)| domain)
    }

    /// Object part after the first `.`, or the whole id when there is none.
    ///
    /// Used as the human-readable label in alert messages.
    pub fn slug(&self) -> &str {
        self.id
            .split_once('.')
            .map(|(_, slug)| slug)
            .unwrap_or(&self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// State of one entity as reported by the provider for a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityState {
    pub id: EntityRef,
    /// `None` when the provider has no record of an update.
    pub last_updated: Option<DateTime<Utc>>,
}
