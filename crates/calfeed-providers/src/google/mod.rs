//! Google Calendar feed integration.

mod client;

pub use client::GoogleClient;
