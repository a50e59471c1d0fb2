//! Lenient calendar-date parsing for stored records.
//!
//! The data store hands back dates as `YYYY-MM-DD` strings and timestamps as
//! ISO-8601 strings, usually in UTC. A timestamp that carries an offset is
//! moved into the reporting time zone before its calendar date is taken, so
//! a record created late in the evening stays on that local day. Bare dates
//! and timestamps without an offset keep their written date.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tracing::warn;

/// Timestamp layout with a space separator and a short `+00` offset.
const SPACED_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// Parse the calendar date of `raw` as seen from `offset`.
///
/// Accepts `2024-01-05`, `2024-01-05T10:00:00Z`, `2024-01-05 10:00:00+00`
/// and similar. Returns `None` for empty or malformed input.
pub fn parse_calendar_date(raw: &str, offset: &FixedOffset) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(instant) = parse_instant(trimmed) {
        return Some(instant.with_timezone(offset).date_naive());
    }

    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A timestamp with an explicit offset, if `raw` is one.
fn parse_instant(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, SPACED_TIMESTAMP))
        .ok()
}

/// Parse an optional date field of a record, logging values that are present
/// but unreadable. Such a field is treated as absent.
pub fn parse_record_date(
    record_id: &str,
    field: &str,
    raw: Option<&str>,
    offset: &FixedOffset,
) -> Option<NaiveDate> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }

    let parsed = parse_calendar_date(raw, offset);
    if parsed.is_none() {
        warn!(
            "Ignoring unreadable {} '{}' on record {}",
            field, raw, record_id
        );
    }
    parsed
}

/// Parse a UTC offset such as `-03:00`, `+05:30` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let trimmed = value.trim();
    DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{}", trimmed))
        .map(|dt| *dt.offset())
        .with_context(|| format!("Invalid UTC offset '{}', expected e.g. -03:00", trimmed))
}

/// The zero offset.
pub fn utc() -> FixedOffset {
    Utc.fix()
}
