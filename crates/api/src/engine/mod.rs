//! Workflow glue: starting runs, relaying their progress, and writing
//! their terminal state back.
//!
//! - [`trigger`] -- `PENDING -> PROCESSING` (or `FAILED`) by starting a run.
//! - [`relay`] -- the per-connection SSE relay task.
//! - [`reconciler`] -- terminal write-back shared by the webhook and the relay.
//! - [`run_registry`] -- TTL-bounded `web_id -> run_id` cache.

pub mod reconciler;
pub mod relay;
pub mod run_registry;
pub mod trigger;
