//! Timezone resolution and calendar-day arithmetic.
//!
//! Feeds deal with three zones at once: the calendar's own zone, optional
//! per-endpoint overrides, and UTC. This module keeps all of the conversions
//! in one place so day-boundary logic never leaks into the pipeline.

use chrono::{DateTime, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors from timezone lookup and temporal parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The zone name is not a known IANA identifier.
    #[error("unknown timezone {0:?}")]
    UnknownZone(String),

    /// A datetime string could not be parsed as RFC 3339.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    /// The local wall-clock time does not exist in the zone (DST gap).
    #[error("no valid local time for {date} in {zone}")]
    NonexistentLocalTime { date: NaiveDate, zone: Tz },
}

/// Looks up an IANA zone by name.
pub fn resolve_zone(name: &str) -> Result<Tz, TimeError> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::UnknownZone(name.to_string()))
}

/// Parses an RFC 3339 datetime into a UTC instant.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, TimeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimeError::InvalidTimestamp(value.to_string()))
}

/// The first instant of `date` in `zone` (local midnight).
pub fn start_of_day_in(date: NaiveDate, zone: Tz) -> Result<DateTime<Tz>, TimeError> {
    local_instant(date, 0, 0, 0, zone)
}

/// The last whole second of `date` in `zone` (local 23:59:59).
pub fn end_of_day_in(date: NaiveDate, zone: Tz) -> Result<DateTime<Tz>, TimeError> {
    local_instant(date, 23, 59, 59, zone)
}

/// Count of calendar-day boundaries crossed between two instants, measured
/// in `zone`. Never negative.
pub fn day_span(start: DateTime<Utc>, end: DateTime<Utc>, zone: Tz) -> i64 {
    let start_day = start.with_timezone(&zone).date_naive();
    let end_day = end.with_timezone(&zone).date_naive();
    (end_day - start_day).num_days().max(0)
}

/// Renders an epoch bound as RFC 3339, in `zone` when given, else UTC.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn epoch_to_rfc3339(epoch: i64, zone: Option<Tz>) -> Option<String> {
    let utc = DateTime::from_timestamp(epoch, 0)?;
    Some(match zone {
        Some(tz) => utc.with_timezone(&tz).to_rfc3339(),
        None => utc.to_rfc3339(),
    })
}

fn local_instant(
    date: NaiveDate,
    hour: u32,
    min: u32,
    sec: u32,
    zone: Tz,
) -> Result<DateTime<Tz>, TimeError> {
    let naive = date.and_hms_opt(hour, min, sec).expect("valid time");
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        // DST fold: take the earlier of the two instants.
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(TimeError::NonexistentLocalTime { date, zone }),
    }
}
