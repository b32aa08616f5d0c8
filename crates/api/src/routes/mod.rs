pub mod feedback;
pub mod health;
pub mod settings;
pub mod spaces;
pub mod webhooks;
pub mod webs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a bearer token.
///
/// Route hierarchy:
///
/// ```text
/// /webs                        list, create (GET, POST)
/// /webs/{id}                   get, update emoji, delete (GET, PATCH, DELETE)
/// /webs/{id}/analyze           start analysis of a PENDING web (POST)
/// /webs/{id}/stream            workflow progress (GET, SSE)
/// /webs/{id}/entities          extracted entities (GET)
/// /webs/{id}/messages          list, append, replace (GET, POST, PUT)
///
/// /spaces                      list, create (GET, POST)
/// /spaces/{id}                 get, update, delete (GET, PATCH, DELETE)
///
/// /feedback                    list own, submit (GET, POST)
///
/// /settings                    get, patch (GET, PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/webs", webs::router())
        .nest("/spaces", spaces::router())
        .nest("/feedback", feedback::router())
        .nest("/settings", settings::router())
}
