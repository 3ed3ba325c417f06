//! Google Calendar API client.
//!
//! A low-level HTTP client for the Calendar API v3 using simple API-key
//! access, which grants read-only access to public calendars. The client
//! builds the events.list query from a [`CalendarConfig`], executes one
//! network call, and maps the response into a [`RawFeed`].

use std::time::Duration;

use calfeed_core::{CalendarConfig, FeedKind, time};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::{BoxFuture, FeedClient};
use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventEndpoint, RawEventTime, RawFeed};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Events per fetch when no cap is configured.
const DEFAULT_MAX_RESULTS: u32 = 2500;

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl Default for GoogleClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl GoogleClient {
    /// Creates a new client with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_feed(&self, config: CalendarConfig) -> ProviderResult<RawFeed> {
        config.validate().map_err(ProviderError::credential)?;

        let calendar_id = config.decoded_calendar_id();
        let query = build_query(&config);
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&calendar_id)
        );

        let response = self
            .http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                ProviderError::network(message).with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::request(extract_api_error(status, &body)));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        let list = parse_event_list(&body)?;

        let feed = into_raw_feed(list, &calendar_id)?;
        debug!(
            calendar = %calendar_id,
            events = feed.events.len(),
            "fetched Google calendar feed"
        );
        Ok(feed)
    }
}

impl FeedClient for GoogleClient {
    fn kind(&self) -> FeedKind {
        FeedKind::Google
    }

    fn fetch(&self, config: CalendarConfig) -> BoxFuture<'_, ProviderResult<RawFeed>> {
        Box::pin(async move { self.fetch_feed(config).await })
    }
}

/// Builds the events.list query parameters for a calendar configuration.
fn build_query(config: &CalendarConfig) -> Vec<(&'static str, String)> {
    let mut query = vec![("key", config.api_key.clone())];

    if config.expand_recurring {
        query.push(("singleEvents", "true".to_string()));
    }

    let search = config.search_query.trim();
    if !search.is_empty() {
        query.push(("q", urlencoding::encode(search).into_owned()));
    }

    let max_results = if config.max_results == 0 {
        DEFAULT_MAX_RESULTS
    } else {
        config.max_results.max(1)
    };
    query.push(("maxResults", max_results.to_string()));

    // The bounds are rendered in the explicit zone when one is configured,
    // matching the zone sent as the timeZone parameter.
    let query_zone: Option<Tz> = match config.timezone.explicit() {
        Some(name) => {
            query.push(("timeZone", name.to_string()));
            time::resolve_zone(name).ok()
        }
        None => None,
    };

    if config.time_min > 0
        && let Some(ts) = time::epoch_to_rfc3339(config.time_min, query_zone)
    {
        query.push(("timeMin", ts));
    }

    if config.time_max > 0
        && let Some(ts) = time::epoch_to_rfc3339(config.time_max, query_zone)
    {
        query.push(("timeMax", ts));
    }

    query
}

/// Pulls the provider-supplied message out of a Google error body.
fn extract_api_error(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let message = value.get("error")?.get("message")?.as_str()?;
            Some(message.to_string())
        });

    match message {
        Some(message) => message,
        None => format!("API error ({}): {}", status, body.trim()),
    }
}

/// Parses a success body into the wire event list, keeping the serde error
/// as the source of the returned error.
fn parse_event_list(body: &str) -> ProviderResult<EventListResponse> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::malformed_response(format!("failed to parse response: {}", e)).with_source(e)
    })
}

/// Folds the wire response into a [`RawFeed`].
///
/// A success body carrying neither items nor a calendar timezone is not a
/// usable feed; zero items with metadata present is a legitimate empty
/// calendar.
fn into_raw_feed(list: EventListResponse, calendar_id: &str) -> ProviderResult<RawFeed> {
    if list.items.is_none() && list.time_zone.is_none() {
        return Err(ProviderError::malformed_response(
            "response has neither items nor a calendar timeZone",
        ));
    }

    let events = list
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(convert_event)
        .collect();

    Ok(RawFeed {
        title: list.summary.unwrap_or_default(),
        description: list.description.unwrap_or_default(),
        timezone: list.time_zone.unwrap_or_default(),
        url: format!(
            "//www.google.com/calendar/embed?src={}",
            urlencoding::encode(calendar_id)
        ),
        events,
    })
}

/// Converts a wire event to a [`RawEvent`].
///
/// Events without an id or without both endpoints are unusable and dropped
/// here; temporal text is carried through unparsed so datetime problems stay
/// a per-event concern during normalization.
fn convert_event(event: ApiEvent) -> Option<RawEvent> {
    let uid = match event.i_cal_uid.or(event.id) {
        Some(uid) => uid,
        None => {
            warn!("dropping event without an id");
            return None;
        }
    };

    let start = match event.start.and_then(convert_endpoint) {
        Some(start) => start,
        None => {
            warn!(uid = %uid, "dropping event without a usable start");
            return None;
        }
    };
    let end = match event.end.and_then(convert_endpoint) {
        Some(end) => end,
        None => {
            warn!(uid = %uid, "dropping event without a usable end");
            return None;
        }
    };

    let mut raw = RawEvent::new(uid, start, end)
        .with_end_time_unspecified(event.end_time_unspecified.unwrap_or(false))
        .with_recurrence(event.recurrence.unwrap_or_default());

    raw.summary = event.summary;
    raw.description = event.description;
    raw.html_link = event.html_link;
    raw.visibility = event.visibility;
    raw.location = event.location;
    raw.color_id = event.color_id;
    raw.status = event.status;

    Some(raw)
}

fn convert_endpoint(endpoint: ApiEventTime) -> Option<RawEventEndpoint> {
    let time = match (endpoint.date_time, endpoint.date) {
        (Some(dt), _) => RawEventTime::DateTime(dt),
        (None, Some(date)) => {
            let parsed = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| warn!("failed to parse endpoint date: {}", e))
                .ok()?;
            RawEventTime::Date(parsed)
        }
        (None, None) => return None,
    };

    Some(RawEventEndpoint {
        time,
        timezone: endpoint.time_zone,
    })
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    summary: Option<String>,
    description: Option<String>,
    time_zone: Option<String>,
    items: Option<Vec<ApiEvent>>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    #[serde(rename = "iCalUID")]
    i_cal_uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    end_time_unspecified: Option<bool>,
    html_link: Option<String>,
    visibility: Option<String>,
    status: Option<String>,
    color_id: Option<String>,
    recurrence: Option<Vec<String>>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
    time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use calfeed_core::TimezoneSetting;

    fn sample_config() -> CalendarConfig {
        CalendarConfig::new(1, "test-key", "team@group.calendar.google.com")
    }

    fn param<'a>(query: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    mod query_building {
        use super::*;

        #[test]
        fn single_events_only_when_expanding() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "singleEvents"), None);

            let query = build_query(&sample_config().with_expand_recurring(true));
            assert_eq!(param(&query, "singleEvents"), Some("true"));
        }

        #[test]
        fn search_query_is_encoded_and_optional() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "q"), None);

            let query = build_query(&sample_config().with_search_query("team standup"));
            assert_eq!(param(&query, "q"), Some("team%20standup"));
        }

        #[test]
        fn max_results_default_and_floor() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "maxResults"), Some("2500"));

            let query = build_query(&sample_config().with_max_results(25));
            assert_eq!(param(&query, "maxResults"), Some("25"));
        }

        #[test]
        fn timezone_sent_only_when_explicit() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "timeZone"), None);

            let query = build_query(&sample_config().with_timezone("America/New_York"));
            assert_eq!(param(&query, "timeZone"), Some("America/New_York"));
        }

        #[test]
        fn bounds_omitted_when_zero() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "timeMin"), None);
            assert_eq!(param(&query, "timeMax"), None);
        }

        #[test]
        fn bounds_rendered_in_query_zone() {
            // 2024-06-01T13:00:00Z
            let config = sample_config()
                .with_timezone("America/New_York")
                .with_time_window(1_717_246_800, 0);
            let query = build_query(&config);
            assert_eq!(param(&query, "timeMin"), Some("2024-06-01T09:00:00-04:00"));
        }

        #[test]
        fn bounds_rendered_in_utc_without_explicit_zone() {
            let config = sample_config().with_time_window(0, 1_717_246_800);
            let query = build_query(&config);
            assert_eq!(param(&query, "timeMax"), Some("2024-06-01T13:00:00+00:00"));
            assert_eq!(
                config.timezone,
                TimezoneSetting::UseCalendar,
                "sanity: no explicit zone configured"
            );
        }

        #[test]
        fn api_key_always_present() {
            let query = build_query(&sample_config());
            assert_eq!(param(&query, "key"), Some("test-key"));
        }
    }

    mod response_mapping {
        use super::*;

        #[test]
        fn parses_event_list_response() {
            let json = r#"{
                "summary": "Town Events",
                "description": "Public happenings",
                "timeZone": "America/New_York",
                "items": [
                    {
                        "id": "evt1",
                        "iCalUID": "evt1@google.com",
                        "summary": "Farmers Market",
                        "start": {"dateTime": "2024-06-01T09:00:00-04:00"},
                        "end": {"dateTime": "2024-06-01T13:00:00-04:00"},
                        "status": "confirmed"
                    }
                ]
            }"#;

            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let feed = into_raw_feed(list, "town@example.com").unwrap();

            assert_eq!(feed.title, "Town Events");
            assert_eq!(feed.timezone, "America/New_York");
            assert_eq!(
                feed.url,
                "//www.google.com/calendar/embed?src=town%40example.com"
            );
            assert_eq!(feed.events.len(), 1);
            assert_eq!(feed.events[0].ical_uid, "evt1@google.com");
            assert_eq!(feed.events[0].status.as_deref(), Some("confirmed"));
        }

        #[test]
        fn empty_calendar_is_a_success_with_metadata() {
            let json = r#"{
                "summary": "Quiet Calendar",
                "timeZone": "Europe/Paris",
                "items": []
            }"#;

            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let feed = into_raw_feed(list, "quiet@example.com").unwrap();

            assert!(feed.events.is_empty());
            assert_eq!(feed.title, "Quiet Calendar");
            assert_eq!(feed.timezone, "Europe/Paris");
        }

        #[test]
        fn response_without_items_or_timezone_is_malformed() {
            let json = r#"{"kind": "calendar#events"}"#;
            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let err = into_raw_feed(list, "x").unwrap_err();
            assert_eq!(err.code(), crate::ProviderErrorCode::MalformedResponse);
        }

        #[test]
        fn all_day_endpoints_become_dates() {
            let json = r#"{
                "timeZone": "UTC",
                "items": [
                    {
                        "id": "evt2",
                        "start": {"date": "2024-03-01"},
                        "end": {"date": "2024-03-04"}
                    }
                ]
            }"#;

            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let feed = into_raw_feed(list, "x").unwrap();
            assert!(feed.events[0].start.time.is_date());
            assert!(feed.events[0].end.time.is_date());
        }

        #[test]
        fn endpoint_timezone_override_is_preserved() {
            let json = r#"{
                "timeZone": "UTC",
                "items": [
                    {
                        "id": "evt3",
                        "start": {
                            "dateTime": "2024-06-01T09:00:00+09:00",
                            "timeZone": "Asia/Tokyo"
                        },
                        "end": {"dateTime": "2024-06-01T10:00:00+09:00"},
                        "endTimeUnspecified": true
                    }
                ]
            }"#;

            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let feed = into_raw_feed(list, "x").unwrap();
            assert_eq!(feed.events[0].start.timezone.as_deref(), Some("Asia/Tokyo"));
            assert!(feed.events[0].end.timezone.is_none());
            assert!(feed.events[0].end_time_unspecified);
        }

        #[test]
        fn events_without_endpoints_are_dropped() {
            let json = r#"{
                "timeZone": "UTC",
                "items": [
                    {"id": "evt4", "start": {"dateTime": "2024-06-01T09:00:00Z"}},
                    {
                        "id": "evt5",
                        "start": {"dateTime": "2024-06-01T09:00:00Z"},
                        "end": {"dateTime": "2024-06-01T10:00:00Z"}
                    }
                ]
            }"#;

            let list: EventListResponse = serde_json::from_str(json).unwrap();
            let feed = into_raw_feed(list, "x").unwrap();
            assert_eq!(feed.events.len(), 1);
            assert_eq!(feed.events[0].ical_uid, "evt5");
        }
    }

    mod body_parsing {
        use super::*;
        use std::error::Error as _;

        #[test]
        fn parse_failure_carries_the_serde_cause() {
            let err = parse_event_list("not json").unwrap_err();

            assert_eq!(err.code(), crate::ProviderErrorCode::MalformedResponse);
            assert!(err.source().is_some());
        }

        #[test]
        fn valid_body_parses() {
            let list = parse_event_list(r#"{"summary": "Town", "timeZone": "UTC"}"#).unwrap();
            assert_eq!(list.summary.as_deref(), Some("Town"));
        }
    }

    mod fetch_preconditions {
        use super::*;
        use crate::client::FeedClient;

        #[tokio::test]
        async fn missing_api_key_fails_before_any_call() {
            let client = GoogleClient::default();
            let config = CalendarConfig::new(1, "", "town@example.com");

            let err = client.fetch(config).await.unwrap_err();
            assert_eq!(err.code(), crate::ProviderErrorCode::Credential);
        }

        #[tokio::test]
        async fn missing_calendar_id_fails_before_any_call() {
            let client = GoogleClient::default();
            let config = CalendarConfig::new(1, "key", "");

            let err = client.fetch(config).await.unwrap_err();
            assert_eq!(err.code(), crate::ProviderErrorCode::Credential);
        }
    }

    mod error_extraction {
        use super::*;

        #[test]
        fn uses_provider_message_when_present() {
            let body = r#"{"error": {"code": 400, "message": "API key not valid."}}"#;
            assert_eq!(
                extract_api_error(reqwest::StatusCode::BAD_REQUEST, body),
                "API key not valid."
            );
        }

        #[test]
        fn falls_back_to_status_and_body() {
            let message = extract_api_error(reqwest::StatusCode::BAD_GATEWAY, "upstream boom");
            assert!(message.contains("502"));
            assert!(message.contains("upstream boom"));
        }
    }
}
