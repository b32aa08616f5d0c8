use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Engine callbacks, mounted at the root. Authenticated by signature,
/// not by bearer token.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/mastra", post(webhooks::mastra))
}
