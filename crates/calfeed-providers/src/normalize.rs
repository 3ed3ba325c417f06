//! RawEvent to Event conversion pipeline.
//!
//! Normalization turns provider payloads into canonical [`Event`]s:
//!
//! 1. Restricted events (private/confidential) are filtered out; simple key
//!    access cannot reliably read their detail.
//! 2. Each endpoint resolves its own zone: the event override when present,
//!    else the calendar's zone.
//! 3. Date-only endpoints are floored to local midnight (start) or ceiled to
//!    local 23:59:59 (end) in the resolved zone; timed endpoints parse as
//!    RFC 3339.
//! 4. Day spans are counted from calendar-local day boundaries, skipped when
//!    the provider marked the end time unspecified.
//!
//! Batch normalization is best-effort: one unparsable event is skipped with
//! a warning and never fails the batch.

use calfeed_core::{
    Event, EventMeta, EventsByStart, FeedKind, TimeError, Visibility, day_span, end_of_day_in,
    parse_rfc3339, resolve_zone, start_of_day_in,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

use crate::raw_event::{RawEvent, RawEventEndpoint, RawEventTime, RawFeed};

/// Why a single event could not be normalized.
#[derive(Debug, Error)]
enum NormalizeError {
    #[error(transparent)]
    Time(#[from] TimeError),

    #[error("event ends before it starts")]
    EndBeforeStart,
}

/// Converts a [`RawEvent`] to a canonical [`Event`].
///
/// Returns `None` when the event is skipped: restricted visibility, an
/// unknown timezone, or unparsable temporal data. Skips are logged and never
/// escalate past the single event.
pub fn normalize_event(
    raw: &RawEvent,
    calendar_id: u64,
    feed_kind: FeedKind,
    calendar_tz: Tz,
) -> Option<Event> {
    let visibility = Visibility::parse(raw.visibility.as_deref());
    if visibility.is_restricted() {
        debug!(uid = %raw.ical_uid, "skipping restricted event");
        return None;
    }

    match build_event(raw, calendar_id, feed_kind, calendar_tz, visibility) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(uid = %raw.ical_uid, error = %err, "skipping event with unusable temporal data");
            None
        }
    }
}

/// Folds a raw feed's events into the snapshot map, keyed by start instant.
pub fn normalize_feed(feed: &RawFeed, calendar_id: u64, feed_kind: FeedKind) -> EventsByStart {
    let calendar_tz = match resolve_zone(&feed.timezone) {
        Ok(tz) => tz,
        Err(err) => {
            warn!(timezone = %feed.timezone, error = %err, "feed has an unusable calendar timezone");
            return EventsByStart::new();
        }
    };

    let mut events = EventsByStart::new();
    for raw in &feed.events {
        if let Some(event) = normalize_event(raw, calendar_id, feed_kind, calendar_tz) {
            events.entry(event.start_utc).or_default().push(event);
        }
    }
    events
}

fn build_event(
    raw: &RawEvent,
    calendar_id: u64,
    feed_kind: FeedKind,
    calendar_tz: Tz,
    visibility: Visibility,
) -> Result<Event, NormalizeError> {
    let start_zone = endpoint_zone(&raw.start, calendar_tz)?;
    let end_zone = endpoint_zone(&raw.end, calendar_tz)?;

    let start = match &raw.start.time {
        RawEventTime::Date(date) => start_of_day_in(*date, start_zone)?.with_timezone(&Utc),
        RawEventTime::DateTime(text) => parse_rfc3339(text)?,
    };
    let end = match &raw.end.time {
        RawEventTime::Date(date) => end_of_day_in(*date, end_zone)?.with_timezone(&Utc),
        RawEventTime::DateTime(text) => parse_rfc3339(text)?,
    };

    if end < start {
        return Err(NormalizeError::EndBeforeStart);
    }

    let multiple_days = if raw.end_time_unspecified {
        None
    } else {
        day_count(start, end, calendar_tz)
    };

    let location = raw.location.clone().unwrap_or_default();
    let recurrence = (!raw.recurrence.is_empty()).then(|| raw.recurrence.clone());

    Ok(Event {
        title: raw.summary.clone().unwrap_or_default(),
        description: raw.description.clone().unwrap_or_default(),
        link: raw.html_link.clone().unwrap_or_default(),
        uid: raw.ical_uid.clone(),
        calendar_id,
        feed_kind,
        start: start.timestamp(),
        end: end.timestamp(),
        start_utc: start.timestamp(),
        end_utc: end.timestamp(),
        start_timezone: start_zone.name().to_string(),
        end_timezone: end_zone.name().to_string(),
        start_location: location.clone(),
        end_location: location,
        whole_day: raw.is_all_day(),
        multiple_days,
        recurrence,
        visibility,
        meta: EventMeta {
            color: raw.color_id.clone(),
            status: raw.status.clone(),
        },
    })
}

fn endpoint_zone(endpoint: &RawEventEndpoint, calendar_tz: Tz) -> Result<Tz, TimeError> {
    match &endpoint.timezone {
        Some(name) => resolve_zone(name),
        None => Ok(calendar_tz),
    }
}

/// Calendar-day count touched by the event, in the calendar's zone.
///
/// A span of zero boundaries is a single-day event (`None`); otherwise the
/// count is `span + 1`, so the result is never 0 or 1.
fn day_count(start: DateTime<Utc>, end: DateTime<Utc>, calendar_tz: Tz) -> Option<u32> {
    let span = day_span(start, end, calendar_tz);
    (span > 0).then(|| span as u32 + 1)
}
