//! TTL-keyed snapshot store.
//!
//! The store maps `(calendar identity, feed kind)` to a cached
//! [`FeedSnapshot`]. Hosts may back the [`FeedStore`] trait with any
//! transient key-value storage; [`MemoryFeedStore`] is the in-process
//! implementation with monotonic-clock expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use calfeed_core::{FeedKind, FeedSnapshot};
use tracing::{debug, trace};

/// Minimum snapshot lifetime regardless of configuration.
///
/// The floor bounds upstream call frequency: a sub-minute TTL would turn
/// every burst of page views into a burst of provider queries.
pub const TTL_FLOOR: Duration = Duration::from_secs(60);

/// Applies the TTL floor to a configured lifetime.
pub fn effective_ttl(configured_secs: u64) -> Duration {
    Duration::from_secs(configured_secs).max(TTL_FLOOR)
}

/// Cache key: one entry per (calendar, feed kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub calendar_id: u64,
    pub kind: FeedKind,
}

impl FeedKey {
    /// Creates a key for the given calendar and feed kind.
    pub fn new(calendar_id: u64, kind: FeedKind) -> Self {
        Self { calendar_id, kind }
    }
}

/// A TTL key-value store holding feed snapshots.
pub trait FeedStore: Send + Sync {
    /// Returns the snapshot for `key` if present and not expired.
    fn get(&self, key: &FeedKey) -> Option<FeedSnapshot>;

    /// Stores a snapshot under `key` for `ttl`, replacing any previous entry.
    fn set(&self, key: FeedKey, snapshot: FeedSnapshot, ttl: Duration);

    /// Drops the entry for `key`.
    fn delete(&self, key: &FeedKey);

    /// Drops every entry belonging to `calendar_id`, across feed kinds.
    fn delete_all_for(&self, calendar_id: u64);
}

#[derive(Debug)]
struct StoreEntry {
    snapshot: FeedSnapshot,
    expires_at: Instant,
}

impl StoreEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`FeedStore`] with monotonic-clock expiry.
#[derive(Debug, Default)]
pub struct MemoryFeedStore {
    entries: Mutex<HashMap<FeedKey, StoreEntry>>,
}

impl MemoryFeedStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired entries and returns how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("feed store lock poisoned");
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                trace!(calendar_id = key.calendar_id, kind = %key.kind, "evicting expired snapshot");
            }
            keep
        });
        before - entries.len()
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("feed store lock poisoned").len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeedStore for MemoryFeedStore {
    fn get(&self, key: &FeedKey) -> Option<FeedSnapshot> {
        let entries = self.entries.lock().expect("feed store lock poisoned");
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.snapshot.clone())
    }

    fn set(&self, key: FeedKey, snapshot: FeedSnapshot, ttl: Duration) {
        let mut entries = self.entries.lock().expect("feed store lock poisoned");
        entries.insert(
            key,
            StoreEntry {
                snapshot,
                expires_at: Instant::now() + ttl,
            },
        );
        debug!(
            calendar_id = key.calendar_id,
            kind = %key.kind,
            ttl_secs = ttl.as_secs(),
            "stored feed snapshot"
        );
    }

    fn delete(&self, key: &FeedKey) {
        let mut entries = self.entries.lock().expect("feed store lock poisoned");
        if entries.remove(key).is_some() {
            debug!(calendar_id = key.calendar_id, kind = %key.kind, "deleted feed snapshot");
        }
    }

    fn delete_all_for(&self, calendar_id: u64) {
        let mut entries = self.entries.lock().expect("feed store lock poisoned");
        let before = entries.len();
        entries.retain(|key, _| key.calendar_id != calendar_id);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(calendar_id, removed, "deleted feed snapshots for calendar");
        }
    }
}
