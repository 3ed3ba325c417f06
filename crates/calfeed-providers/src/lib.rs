//! FeedClient trait and provider implementations.
//!
//! This crate covers everything between a calendar configuration and a batch
//! of canonical events:
//!
//! - [`FeedClient`] - the trait a calendar backend implements
//! - [`RawFeed`] / [`RawEvent`] - provider payloads before normalization
//! - [`normalize_event`] / [`normalize_feed`] - the raw-to-canonical pipeline
//! - [`ProviderError`] - error types for provider operations
//!
//! # Pipeline
//!
//! ```text
//! CalendarConfig ──▶ GoogleClient::fetch ──▶ RawFeed
//!                                              │
//!                                              ▼ normalize_feed()
//!                                        EventsByStart
//! ```

pub mod client;
pub mod error;
pub mod google;
pub mod normalize;
pub mod raw_event;

pub use client::{BoxFuture, FeedClient};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use google::GoogleClient;
pub use normalize::{normalize_event, normalize_feed};
pub use raw_event::{RawEvent, RawEventEndpoint, RawEventTime, RawFeed};
