//! External delivery channels for stale-entity alerts.

pub mod telegram;
