//! Home Assistant state provider.
//!
//! [`HomeAssistantApi`] talks to the Home Assistant REST API and
//! implements [`watchdog_core::StateProvider`], grouping entities by
//! domain for category discovery.

pub mod api;
pub mod messages;

pub use api::{HomeAssistantApi, HomeAssistantApiError, HomeAssistantConfig};
