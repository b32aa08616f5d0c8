//! Notification delivery channels.

pub mod knock;
pub mod log;
