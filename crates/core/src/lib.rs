//! Domain types and pure logic shared by every Webs crate.
//!
//! Nothing in here performs I/O. The db, events, mastra and api crates
//! build on these types and helpers.

pub mod analysis;
pub mod error;
pub mod notifications;
pub mod reconnect;
pub mod steps;
pub mod stream_events;
pub mod types;
pub mod validation;
