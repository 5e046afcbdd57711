//! State provider interface.
//!
//! The core never talks to a concrete backend; it consumes a
//! [`StateProvider`] shared across concurrent check tasks.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{EntityRef, EntityState};

/// Entities grouped by category name (e.g. `"person"`, `"sensor"`).
pub type EntityCatalog = HashMap<String, Vec<EntityRef>>;

/// Source of entity state.
///
/// Implementations must be safe for concurrent use; the scanner calls
/// `get_entity` from many tasks at once, up to its concurrency cap.
#[async_trait]
pub trait StateProvider: Send + Sync {
    /// Fetch the current state of one entity.
    ///
    /// Returns [`ProviderError::NotFound`] when the provider has no such
    /// entity.
    async fn get_entity(&self, id: &EntityRef) -> Result<EntityState, ProviderError>;

    /// List every known entity, grouped by category.
    async fn list_entities(&self) -> Result<EntityCatalog, ProviderError>;
}
