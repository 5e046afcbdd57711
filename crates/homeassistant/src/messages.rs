//! Home Assistant REST payloads.
//!
//! `GET /api/states` returns an array of state objects and
//! `GET /api/states/<entity_id>` returns a single one:
//!
//! ```json
//! {
//!   "entity_id": "person.alice",
//!   "state": "home",
//!   "last_changed": "2024-01-01T12:00:00.123456+00:00",
//!   "last_updated": "2024-01-01T12:00:00.123456+00:00",
//!   "attributes": { "friendly_name": "Alice" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Deserialize;

use watchdog_core::{EntityCatalog, EntityRef, EntityState};

/// One entity state object.
#[derive(Debug, Clone, Deserialize)]
pub struct StateObject {
    pub entity_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_changed: Option<DateTime<Utc>>,
    /// Absent or `null` when Home Assistant has no update on record.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl StateObject {
    pub fn into_entity_state(self) -> EntityState {
        EntityState {
            id: EntityRef::new(self.entity_id),
            last_updated: self.last_updated,
        }
    }
}

/// Group state objects by domain (`person`, `sensor`, ...), keeping the
/// order Home Assistant returned them in.
pub fn group_by_domain(states: Vec<StateObject>) -> EntityCatalog {
    let mut catalog = EntityCatalog::new();
    for state in states {
        let entity = EntityRef::new(state.entity_id);
        match entity.domain().map(str::to_string) {
            Some(domain) => catalog.entry(domain).or_default().push(entity),
            None => {
                tracing::debug!(entity_id = %entity, "Skipping entity without a domain");
            }
        }
    }
    catalog
}
