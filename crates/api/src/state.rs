use std::sync::Arc;

use webs_db::store::WebStore;
use webs_events::{EventBus, Notifier};
use webs_mastra::WorkflowClient;

use crate::config::ServerConfig;
use crate::engine::run_registry::RunRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used by the CRUD handlers.
    pub pool: webs_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Status transitions of webs (trigger, relay, reconciler).
    pub store: Arc<dyn WebStore>,
    /// Remote workflow engine.
    pub workflows: Arc<dyn WorkflowClient>,
    /// Outbound user notifications.
    pub notifier: Arc<dyn Notifier>,
    /// In-process events; terminal transitions are published here.
    pub event_bus: Arc<EventBus>,
    /// `web_id -> run_id` cache between trigger and stream.
    pub runs: Arc<RunRegistry>,
}
