//! Freshness window configuration.
//!
//! The window is written as `days=<n>,hours=<n>,minutes=<n>` (fields in
//! that exact order) and resolves to a single [`TimeDelta`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use crate::humanize::format_duration;

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: &str = "days=30,hours=0,minutes=0";

/// Anchored at both ends: trailing garbage is rejected. ASCII digits only.
pub const THRESHOLD_PATTERN: &str = r"^days=([0-9]+),hours=([0-9]+),minutes=([0-9]+)$";

static THRESHOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(THRESHOLD_PATTERN).expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThresholdParseError {
    #[error("Invalid threshold format {raw:?}: expected days=<n>,hours=<n>,minutes=<n>")]
    Format { raw: String },

    #[error("Threshold field {field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Maximum tolerated staleness, parsed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl ThresholdConfig {
    pub fn parse(raw: &str) -> Result<Self, ThresholdParseError> {
        let caps = THRESHOLD_RE
            .captures(raw.trim())
            .ok_or_else(|| ThresholdParseError::Format {
                raw: raw.to_string(),
            })?;

        let field = |idx: usize, name: &'static str| -> Result<u32, ThresholdParseError> {
            let value = &caps[idx];
            value
                .parse::<u32>()
                .map_err(|_| ThresholdParseError::OutOfRange {
                    field: name,
                    value: value.to_string(),
                })
        };

        Ok(Self {
            days: field(1, "days")?,
            hours: field(2, "hours")?,
            minutes: field(3, "minutes")?,
        })
    }

    /// Total window: days x 24h + hours x 60m + minutes.
    ///
    /// Every component fits in `u32`, so the sum stays far below
    /// `TimeDelta::MAX` and cannot overflow.
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.days))
            + TimeDelta::hours(i64::from(self.hours))
            + TimeDelta::minutes(i64::from(self.minutes))
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            days: 30,
            hours: 0,
            minutes: 0,
        }
    }
}

impl FromStr for ThresholdConfig {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ThresholdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.duration()))
    }
}
