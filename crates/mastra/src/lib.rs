//! Client and stream translation for the remote workflow engine (Mastra).
//!
//! - [`api`]: the [`WorkflowClient`] seam and its HTTP implementation.
//! - [`framing`]: splits the watch response body into JSON records.
//! - [`messages`]: typed engine records.
//! - [`relay`]: turns engine records into browser-facing [`RelayEvent`]s.

pub mod api;
pub mod error;
pub mod events;
pub mod framing;
pub mod messages;
pub mod relay;

pub use api::{MastraApi, WorkflowClient, WorkflowStream};
pub use error::MastraError;
pub use events::RelayEvent;
pub use relay::StreamRelay;
