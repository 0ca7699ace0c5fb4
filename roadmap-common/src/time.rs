//! Timestamp utilities

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as an RFC 3339 string, the format every stored timestamp uses.
///
/// Fixed microsecond precision keeps stored values lexically sortable.
pub fn now_rfc3339() -> String {
    format_rfc3339(&now())
}

/// Format a UTC timestamp the same way `now_rfc3339` does
pub fn format_rfc3339(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 timestamp back into UTC
pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// True when `timestamp + days` lies before `reference`
///
/// A window too large to represent never elapses; one too negative always has.
pub fn is_older_than_days(timestamp: DateTime<Utc>, days: i64, reference: DateTime<Utc>) -> bool {
    match Duration::try_days(days).and_then(|window| timestamp.checked_add_signed(window)) {
        Some(deadline) => deadline < reference,
        None => days < 0,
    }
}
