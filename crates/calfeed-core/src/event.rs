//! Canonical event and snapshot types.
//!
//! This module provides the normalized representation of calendar data:
//! - [`Event`]: a single calendar event after normalization
//! - [`FeedSnapshot`]: the immutable result of one fetch-and-normalize cycle
//! - [`Visibility`], [`EventMeta`], [`FeedKind`]: supporting enums and metadata

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which provider integration produced a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// Google Calendar via simple API-key access.
    Google,
}

impl FeedKind {
    /// Returns the stable identifier used in cache keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event visibility as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// The calendar's default visibility.
    #[default]
    Default,
    /// Visible to anyone who can see the calendar.
    Public,
    /// Visible only to attendees.
    Private,
    /// Provider alias for private.
    Confidential,
}

impl Visibility {
    /// Parses the provider's visibility string; unknown values map to the default.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("public") => Self::Public,
            Some("private") => Self::Private,
            Some("confidential") => Self::Confidential,
            _ => Self::Default,
        }
    }

    /// Returns true for events that simple key access cannot reliably read.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Private | Self::Confidential)
    }
}

/// Provider metadata carried through normalization unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// The provider's color identifier for the event.
    pub color: Option<String>,
    /// The provider's event status (e.g., "confirmed", "tentative").
    pub status: Option<String>,
}

/// A normalized calendar event.
///
/// All temporal fields are epoch seconds. `start`/`end` and
/// `start_utc`/`end_utc` refer to the same instants; the split is kept for
/// consumers that distinguish display values from UTC keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    /// Direct link to the event in the provider UI.
    pub link: String,
    /// The provider's iCalendar UID for the event.
    pub uid: String,
    /// Host-side identity of the calendar this event belongs to.
    pub calendar_id: u64,
    pub feed_kind: FeedKind,
    pub start: i64,
    pub end: i64,
    pub start_utc: i64,
    pub end_utc: i64,
    /// IANA zone name resolved for the start endpoint.
    pub start_timezone: String,
    /// IANA zone name resolved for the end endpoint.
    pub end_timezone: String,
    pub start_location: String,
    /// Always equal to `start_location`; the provider model has one location.
    pub end_location: String,
    /// True when the event was specified by calendar dates only.
    pub whole_day: bool,
    /// Count of calendar days the event touches in the calendar's zone.
    /// `None` for single-day events; `Some(n)` always has `n >= 2`.
    pub multiple_days: Option<u32>,
    /// Recurrence rules passed through from the provider, in order.
    pub recurrence: Option<Vec<String>>,
    pub visibility: Visibility,
    pub meta: EventMeta,
}

impl Event {
    /// Returns true if the event spans more than one calendar day.
    pub fn spans_multiple_days(&self) -> bool {
        self.multiple_days.is_some()
    }

    /// Returns true if the event carries recurrence rules.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// Events keyed by their start instant (UTC epoch seconds), ascending.
pub type EventsByStart = BTreeMap<i64, Vec<Event>>;

/// The cached result of one successful fetch-and-normalize cycle.
///
/// Snapshots are immutable after assembly and replaced wholesale on the next
/// successful fetch, never patched incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// The calendar title reported by the provider.
    pub title: String,
    /// The calendar description reported by the provider.
    pub description: String,
    /// The calendar's IANA timezone.
    pub timezone: String,
    /// Public URL for the calendar.
    pub url: String,
    pub events: EventsByStart,
}

impl FeedSnapshot {
    /// Returns true if the snapshot holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events across all start instants.
    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
