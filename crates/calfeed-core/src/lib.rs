//! Core types: calendar configuration, events, snapshots, time arithmetic

pub mod config;
pub mod event;
pub mod time;
pub mod tracing;

pub use config::{CalendarConfig, TimezoneSetting};
pub use event::{Event, EventMeta, EventsByStart, FeedKind, FeedSnapshot, Visibility};
pub use time::{
    TimeError, day_span, end_of_day_in, epoch_to_rfc3339, parse_rfc3339, resolve_zone,
    start_of_day_in,
};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
