use axum::routing::get;
use axum::Router;

use crate::handlers::spaces;
use crate::state::AppState;

/// Routes mounted at `/spaces`.
///
/// ```text
/// GET    /          -> list
/// POST   /          -> create
/// GET    /{id}      -> get_by_id
/// PATCH  /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(spaces::list).post(spaces::create))
        .route(
            "/{id}",
            get(spaces::get_by_id)
                .patch(spaces::update)
                .delete(spaces::delete),
        )
}
