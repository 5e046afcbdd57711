//! Working-set resolution: which entities does this pass check?

use crate::error::ResolutionError;
use crate::provider::StateProvider;
use crate::types::EntityRef;

/// Category discovered when the operator supplies no explicit list.
pub const DEFAULT_CATEGORY: &str = "person";

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Operator-supplied identifiers, taken verbatim.
    Explicit(Vec<EntityRef>),
    /// Entities the provider listed under the requested category.
    Discovered(Vec<EntityRef>),
    /// The provider has no such category at all. Not an error.
    NothingToCheck,
}

impl Resolution {
    pub fn entities(&self) -> &[EntityRef] {
        match self {
            Self::Explicit(entities) | Self::Discovered(entities) => entities,
            Self::NothingToCheck => &[],
        }
    }

    pub fn into_entities(self) -> Vec<EntityRef> {
        match self {
            Self::Explicit(entities) | Self::Discovered(entities) => entities,
            Self::NothingToCheck => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }
}

/// Determine the entities to check.
///
/// A non-empty `explicit_ids` is used as-is without contacting the
/// provider. Otherwise the provider is asked exactly once for its full
/// catalog and the `category` group is returned.
pub async fn resolve(
    explicit_ids: Option<&[String]>,
    provider: &dyn StateProvider,
    category: &str,
) -> Result<Resolution, ResolutionError> {
    if let Some(ids) = explicit_ids.filter(|ids| !ids.is_empty()) {
        let entities: Vec<EntityRef> = ids.iter().map(|id| EntityRef::new(id.as_str())).collect();
        tracing::info!(count = entities.len(), "Using explicit entity list");
        return Ok(Resolution::Explicit(entities));
    }

    tracing::info!(category, "No explicit entity list; discovering by category");

    let mut catalog = provider.list_entities().await?;

    match catalog.remove(category) {
        Some(entities) => {
            tracing::info!(category, count = entities.len(), "Discovered entities");
            Ok(Resolution::Discovered(entities))
        }
        None => {
            tracing::info!(category, "Category not present on provider; nothing to check");
            Ok(Resolution::NothingToCheck)
        }
    }
}
