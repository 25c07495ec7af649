//! Human-readable elapsed time since a logged activity.

use chrono::{DateTime, Duration, Utc};

/// Placeholder shown when an activity type has never been logged.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats the time elapsed between `timestamp_ms` and `now`.
///
/// Uses the two most significant units: `45s`, `12m`, `3h 12m`, `2d 5h`.
/// Trailing zero units are dropped (`2h`, not `2h 0m`). Timestamps in the
/// future are treated as zero elapsed time.
pub fn format_elapsed(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let elapsed_ms = now.timestamp_millis().saturating_sub(timestamp_ms).max(0);
    format_duration(Duration::milliseconds(elapsed_ms))
}

fn format_duration(elapsed: Duration) -> String {
    let days = elapsed.num_days();
    let hours = elapsed.num_hours() % 24;
    let minutes = elapsed.num_minutes() % 60;

    if days > 0 {
        return with_remainder(days, 'd', hours, 'h');
    }
    if hours > 0 {
        return with_remainder(hours, 'h', minutes, 'm');
    }
    if minutes > 0 {
        return format!("{minutes}m");
    }
    format!("{}s", elapsed.num_seconds())
}

fn with_remainder(major: i64, major_unit: char, minor: i64, minor_unit: char) -> String {
    if minor == 0 {
        format!("{major}{major_unit}")
    } else {
        format!("{major}{major_unit} {minor}{minor_unit}")
    }
}
