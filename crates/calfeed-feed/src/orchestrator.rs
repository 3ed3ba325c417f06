//! The public feed entry point.
//!
//! [`FeedOrchestrator::get_events`] walks one request through the cache and,
//! on a miss, through the provider client and normalizer. Provider failures
//! are soft: the caller receives a requester-facing notice string instead of
//! an error, and nothing is cached.
//!
//! Concurrent misses for the same key are not coordinated: each one queries
//! the provider and the last writer wins. Collapsing them behind a per-key
//! single-flight lock would change observable behavior and is deliberately
//! not done here.

use std::sync::Arc;

use calfeed_core::{CalendarConfig, EventsByStart, FeedSnapshot};
use calfeed_providers::{FeedClient, ProviderError, normalize_feed};
use tracing::{debug, warn};

use crate::cache::{FeedKey, FeedStore, effective_ttl};

/// What a feed request produced.
///
/// Callers distinguish by value kind: the ordered event map on success, or a
/// notice meant for display when the provider call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Events {
        /// Events keyed by start instant, ascending. May be empty for a
        /// calendar that legitimately has no events in range.
        events: EventsByStart,
        /// The display timezone for this feed: the provider-reported zone
        /// when the configuration says to adopt it, otherwise the
        /// configured one.
        timezone: String,
    },
    /// A requester-facing message describing a provider failure.
    Notice(String),
}

impl FeedOutcome {
    /// Returns the event map, if this outcome is a success.
    pub fn events(&self) -> Option<&EventsByStart> {
        match self {
            Self::Events { events, .. } => Some(events),
            Self::Notice(_) => None,
        }
    }

    /// Returns the display timezone, if this outcome is a success.
    pub fn timezone(&self) -> Option<&str> {
        match self {
            Self::Events { timezone, .. } => Some(timezone),
            Self::Notice(_) => None,
        }
    }

    /// Returns true if this outcome is a failure notice.
    pub fn is_notice(&self) -> bool {
        matches!(self, Self::Notice(_))
    }
}

/// Orchestrates cache lookups and provider fetches for calendar feeds.
pub struct FeedOrchestrator {
    client: Arc<dyn FeedClient>,
    store: Arc<dyn FeedStore>,
}

impl FeedOrchestrator {
    /// Creates an orchestrator over one provider client and one store.
    pub fn new(client: Arc<dyn FeedClient>, store: Arc<dyn FeedStore>) -> Self {
        Self { client, store }
    }

    /// Returns the events for `config`, fetching and caching on a miss.
    ///
    /// One invocation is one pass through the state machine: cache lookup,
    /// then at most one provider call. There are no retries; a later
    /// independent call starts over.
    ///
    /// On success the outcome also carries the display timezone: the zone the
    /// provider reported for the calendar when the configuration adopts it,
    /// otherwise the explicitly configured one. Adoption applies on both the
    /// cached and freshly fetched paths.
    pub async fn get_events(&self, config: CalendarConfig) -> FeedOutcome {
        let key = FeedKey::new(config.calendar_id, self.client.kind());

        if let Some(snapshot) = self.store.get(&key) {
            debug!(calendar_id = config.calendar_id, "feed cache hit");
            let timezone = config.timezone.resolve(&snapshot.timezone).to_string();
            return FeedOutcome::Events {
                events: snapshot.events,
                timezone,
            };
        }

        debug!(calendar_id = config.calendar_id, "feed cache miss, querying provider");
        let feed = match self.client.fetch(config.clone()).await {
            Ok(feed) => feed,
            Err(err) => {
                warn!(
                    calendar_id = config.calendar_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "provider fetch failed"
                );
                return FeedOutcome::Notice(failure_notice(&err));
            }
        };

        let events = normalize_feed(&feed, config.calendar_id, self.client.kind());
        let snapshot = FeedSnapshot {
            title: feed.title,
            description: feed.description,
            timezone: feed.timezone,
            url: feed.url,
            events,
        };

        // Empty results are returned but never cached: a transient empty
        // response is retried on the next request instead of being pinned
        // for the whole TTL.
        if !snapshot.is_empty() {
            self.store
                .set(key, snapshot.clone(), effective_ttl(config.cache_ttl_secs));
        }

        let timezone = config.timezone.resolve(&snapshot.timezone).to_string();
        FeedOutcome::Events {
            events: snapshot.events,
            timezone,
        }
    }

    /// Drops the cached snapshot for one calendar under this client's kind.
    pub fn invalidate(&self, calendar_id: u64) {
        self.store
            .delete(&FeedKey::new(calendar_id, self.client.kind()));
    }

    /// Drops every cached snapshot for a calendar, across feed kinds.
    /// Hosts call this when a calendar is edited or removed.
    pub fn invalidate_calendar(&self, calendar_id: u64) {
        self.store.delete_all_for(calendar_id);
    }
}

/// Builds the requester-facing message for a failed provider call.
fn failure_notice(err: &ProviderError) -> String {
    format!(
        "While trying to retrieve events, the calendar provider returned an error:\n\n\
         {err}\n\n\
         Please ensure that both your calendar ID and API key are valid and that the \
         calendar you want to display is public.\n\n\
         Only you can see this notice."
    )
}
