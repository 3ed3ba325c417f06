//! Raw feed payloads as returned by a provider, before normalization.
//!
//! [`RawEvent`] preserves the provider's view of an event: endpoints are
//! either date-only values or RFC 3339 datetime text, each with an optional
//! timezone override. Datetime text is kept unparsed so that one bad value
//! fails one event during normalization instead of failing the fetch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The temporal value of one event endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawEventTime {
    /// A date-only value (all-day events).
    Date(NaiveDate),
    /// An RFC 3339 datetime, kept as text.
    DateTime(String),
}

impl RawEventTime {
    /// Returns true if this is a date-only value.
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// One endpoint (start or end) of a raw event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventEndpoint {
    pub time: RawEventTime,
    /// Per-event timezone override; normalization falls back to the
    /// calendar's zone when absent.
    pub timezone: Option<String>,
}

impl RawEventEndpoint {
    /// Creates a date-only endpoint.
    pub fn date(date: NaiveDate) -> Self {
        Self {
            time: RawEventTime::Date(date),
            timezone: None,
        }
    }

    /// Creates a datetime endpoint from RFC 3339 text.
    pub fn datetime(value: impl Into<String>) -> Self {
        Self {
            time: RawEventTime::DateTime(value.into()),
            timezone: None,
        }
    }

    /// Builder method to set the timezone override.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A raw calendar event from a provider.
///
/// Treated as read-only input to normalization; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The provider's iCalendar UID for the event.
    pub ical_uid: String,
    pub start: RawEventEndpoint,
    pub end: RawEventEndpoint,
    /// Set when the provider marked the end time as unspecified; span
    /// computation is skipped for these events.
    pub end_time_unspecified: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Direct link to the event in the provider UI.
    pub html_link: Option<String>,
    /// Provider visibility string ("default", "public", "private", ...).
    pub visibility: Option<String>,
    pub location: Option<String>,
    /// Recurrence rules in provider order; empty for one-off events.
    pub recurrence: Vec<String>,
    pub color_id: Option<String>,
    pub status: Option<String>,
}

impl RawEvent {
    /// Creates a raw event with the minimum required fields.
    pub fn new(
        ical_uid: impl Into<String>,
        start: RawEventEndpoint,
        end: RawEventEndpoint,
    ) -> Self {
        Self {
            ical_uid: ical_uid.into(),
            start,
            end,
            end_time_unspecified: false,
            summary: None,
            description: None,
            html_link: None,
            visibility: None,
            location: None,
            recurrence: Vec::new(),
            color_id: None,
            status: None,
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the HTML link.
    pub fn with_html_link(mut self, html_link: impl Into<String>) -> Self {
        self.html_link = Some(html_link.into());
        self
    }

    /// Builder method to set the visibility string.
    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the recurrence rules.
    pub fn with_recurrence(mut self, recurrence: Vec<String>) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Builder method to set the color id.
    pub fn with_color_id(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builder method to mark the end time as unspecified.
    pub fn with_end_time_unspecified(mut self, unspecified: bool) -> Self {
        self.end_time_unspecified = unspecified;
        self
    }

    /// Returns true if either endpoint is date-only.
    pub fn is_all_day(&self) -> bool {
        self.start.time.is_date() || self.end.time.is_date()
    }
}

/// A raw provider response: calendar metadata plus unnormalized events.
///
/// An empty `events` list is a legitimate success (a calendar with no events
/// in range); the metadata is still populated so callers can adopt the
/// calendar's title, description and timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFeed {
    pub title: String,
    pub description: String,
    /// The calendar's IANA timezone as reported by the provider.
    pub timezone: String,
    /// Public URL for the calendar.
    pub url: String,
    pub events: Vec<RawEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn endpoint_variants() {
        let dated = RawEventEndpoint::date(sample_date());
        assert!(dated.time.is_date());
        assert!(dated.timezone.is_none());

        let timed = RawEventEndpoint::datetime("2024-06-01T09:00:00-04:00")
            .with_timezone("America/New_York");
        assert!(!timed.time.is_date());
        assert_eq!(timed.timezone.as_deref(), Some("America/New_York"));
    }

    #[test]
    fn raw_event_builder() {
        let event = RawEvent::new(
            "uid-1",
            RawEventEndpoint::datetime("2024-06-01T09:00:00Z"),
            RawEventEndpoint::datetime("2024-06-01T10:00:00Z"),
        )
        .with_summary("Planning")
        .with_description("Quarterly planning")
        .with_html_link("https://calendar.example/event/1")
        .with_visibility("public")
        .with_location("Room 4")
        .with_recurrence(vec!["RRULE:FREQ=WEEKLY".to_string()])
        .with_color_id("5")
        .with_status("confirmed");

        assert_eq!(event.ical_uid, "uid-1");
        assert_eq!(event.summary.as_deref(), Some("Planning"));
        assert_eq!(event.visibility.as_deref(), Some("public"));
        assert_eq!(event.recurrence.len(), 1);
        assert!(!event.end_time_unspecified);
        assert!(!event.is_all_day());
    }

    #[test]
    fn all_day_detection() {
        let event = RawEvent::new(
            "uid-2",
            RawEventEndpoint::date(sample_date()),
            RawEventEndpoint::date(sample_date()),
        );
        assert!(event.is_all_day());
    }
}
