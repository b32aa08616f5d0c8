//! Routes mounted at `/webs`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{messages, stream, webs};
use crate::state::AppState;

/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PATCH  /{id}              -> update_emoji
/// DELETE /{id}              -> delete
/// POST   /{id}/analyze      -> analyze
/// GET    /{id}/stream       -> stream (SSE)
/// GET    /{id}/entities     -> list_entities
/// GET    /{id}/messages     -> messages::list
/// POST   /{id}/messages     -> messages::append
/// PUT    /{id}/messages     -> messages::replace
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(webs::list).post(webs::create))
        .route(
            "/{id}",
            get(webs::get_by_id)
                .patch(webs::update_emoji)
                .delete(webs::delete),
        )
        .route("/{id}/analyze", post(webs::analyze))
        .route("/{id}/stream", get(stream::stream))
        .route("/{id}/entities", get(webs::list_entities))
        .route(
            "/{id}/messages",
            get(messages::list)
                .post(messages::append)
                .put(messages::replace),
        )
}
