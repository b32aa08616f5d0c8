//! Webs event bus and outbound notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope (`web.completed`, ...).
//! - [`Notifier`]: the outbound notification seam, with the Knock
//!   implementation in [`delivery::knock`] and a log-only fallback in
//!   [`delivery::log`].

pub mod bus;
pub mod delivery;
pub mod notify;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::knock::{KnockConfig, KnockNotifier};
pub use delivery::log::LogNotifier;
pub use notify::{NotificationRequest, NotifyError, Notifier};
