//! Calendar configuration passed into the feed pipeline.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// How the display timezone for a calendar is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimezoneSetting {
    /// Adopt the timezone the provider reports for the calendar.
    #[default]
    UseCalendar,
    /// A fixed IANA timezone name.
    Explicit(String),
}

impl TimezoneSetting {
    /// Returns the explicit zone name, if one is configured.
    pub fn explicit(&self) -> Option<&str> {
        match self {
            Self::Explicit(tz) => Some(tz.as_str()),
            Self::UseCalendar => None,
        }
    }

    /// Resolves the display timezone against the zone a fetched calendar reported.
    pub fn resolve<'a>(&'a self, calendar_timezone: &'a str) -> &'a str {
        match self {
            Self::Explicit(tz) => tz.as_str(),
            Self::UseCalendar => calendar_timezone,
        }
    }
}

/// Configuration for one calendar feed.
///
/// Owned by the caller and passed into the orchestrator by value; the
/// pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Host-side identity of the calendar.
    pub calendar_id: u64,
    /// Provider API key. Simple key access grants read-only access to public
    /// calendars.
    pub api_key: String,
    /// Provider calendar identifier; the host may store it base64-encoded.
    pub provider_calendar_id: String,
    pub timezone: TimezoneSetting,
    /// Lower bound (inclusive) for an event's end time, epoch seconds.
    /// `0` means unbounded.
    pub time_min: i64,
    /// Upper bound (exclusive) for an event's start time, epoch seconds.
    /// `0` means unbounded.
    pub time_max: i64,
    /// Expand recurring events into single instances.
    pub expand_recurring: bool,
    /// Free-text search terms; empty means no filter.
    pub search_query: String,
    /// Cap on events returned per fetch; `0` means the provider default.
    pub max_results: u32,
    /// Configured cache lifetime in seconds. A 60 second floor applies when
    /// snapshots are stored.
    pub cache_ttl_secs: u64,
}

impl CalendarConfig {
    /// Creates a configuration with the required identity fields and
    /// unbounded defaults everywhere else.
    pub fn new(
        calendar_id: u64,
        api_key: impl Into<String>,
        provider_calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            calendar_id,
            api_key: api_key.into(),
            provider_calendar_id: provider_calendar_id.into(),
            timezone: TimezoneSetting::default(),
            time_min: 0,
            time_max: 0,
            expand_recurring: false,
            search_query: String::new(),
            max_results: 0,
            cache_ttl_secs: 0,
        }
    }

    /// Builder method to set an explicit timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = TimezoneSetting::Explicit(timezone.into());
        self
    }

    /// Builder method to set the time window bounds.
    pub fn with_time_window(mut self, time_min: i64, time_max: i64) -> Self {
        self.time_min = time_min;
        self.time_max = time_max;
        self
    }

    /// Builder method to enable recurring-event expansion.
    pub fn with_expand_recurring(mut self, expand: bool) -> Self {
        self.expand_recurring = expand;
        self
    }

    /// Builder method to set the search query.
    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// Builder method to cap the number of results.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Builder method to set the cache lifetime.
    pub fn with_cache_ttl(mut self, cache_ttl_secs: u64) -> Self {
        self.cache_ttl_secs = cache_ttl_secs;
        self
    }

    /// The provider calendar id with host encoding removed.
    ///
    /// The host stores ids base64-encoded; values that do not round-trip as
    /// UTF-8 base64 pass through unchanged.
    pub fn decoded_calendar_id(&self) -> String {
        let raw = self.provider_calendar_id.trim();
        match BASE64.decode(raw) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(decoded) if !decoded.is_empty() => decoded,
                _ => raw.to_string(),
            },
            Err(_) => raw.to_string(),
        }
    }

    /// Validates that the configuration can be used for a fetch.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.api_key.trim().is_empty() {
            return Err("api_key is required");
        }
        if self.provider_calendar_id.trim().is_empty() {
            return Err("provider calendar id is required");
        }
        Ok(())
    }
}
