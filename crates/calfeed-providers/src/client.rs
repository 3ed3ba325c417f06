//! FeedClient trait definition.
//!
//! [`FeedClient`] is the seam between the orchestration layer and a concrete
//! calendar backend. The trait is object-safe so orchestrators can hold
//! `Arc<dyn FeedClient>`; async methods return boxed futures.

use std::future::Future;
use std::pin::Pin;

use calfeed_core::{CalendarConfig, FeedKind};

use crate::error::ProviderResult;
use crate::raw_event::RawFeed;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A calendar backend able to fetch a raw feed for one configured calendar.
///
/// Implementations build the provider query from the configuration, execute
/// exactly one network call, and map the response into a [`RawFeed`]. All
/// failure modes surface as a single [`ProviderError`](crate::ProviderError)
/// carrying the provider's message text; a calendar with zero events in
/// range is a success with an empty event list, not an error.
pub trait FeedClient: Send + Sync {
    /// Which feed kind this client produces.
    fn kind(&self) -> FeedKind;

    /// Executes one provider query built from `config`.
    fn fetch(&self, config: CalendarConfig) -> BoxFuture<'_, ProviderResult<RawFeed>>;
}
