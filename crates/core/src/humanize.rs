//! Human-readable duration rendering for alert text.

use chrono::TimeDelta;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Render `d` as e.g. `"1 day 2 mins"`.
///
/// Only non-zero components are emitted, largest unit first. Sub-second
/// precision is dropped. Zero and negative durations render as `""`.
pub fn format_duration(d: TimeDelta) -> String {
    let total = d.num_seconds().max(0);

    let days = total / SECS_PER_DAY;
    let hours = (total % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total % SECS_PER_MINUTE;

    [
        (days, "day"),
        (hours, "hour"),
        (minutes, "min"),
        (seconds, "sec"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, unit)| {
        if n == 1 {
            format!("{n} {unit}")
        } else {
            format!("{n} {unit}s")
        }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
