//! Feed orchestration: TTL snapshot cache and the `get_events` entry point.
//!
//! This crate sits on top of `calfeed-providers` and owns the cache
//! lifecycle:
//!
//! ```text
//! get_events ──▶ FeedStore.get ──hit──▶ snapshot.events
//!                    │ miss
//!                    ▼
//!               FeedClient.fetch ──err──▶ FeedOutcome::Notice
//!                    │ ok
//!                    ▼
//!               normalize_feed ──▶ FeedSnapshot ──non-empty──▶ FeedStore.set
//!                                       │
//!                                       ▼
//!                              FeedOutcome::Events
//! ```

pub mod cache;
pub mod orchestrator;

pub use cache::{FeedKey, FeedStore, MemoryFeedStore, TTL_FLOOR, effective_ttl};
pub use orchestrator::{FeedOrchestrator, FeedOutcome};
