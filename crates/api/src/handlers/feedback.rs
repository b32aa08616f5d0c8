//! Handlers for `/feedback`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use webs_core::validation::{validate_length, validate_rating, validate_required, MAX_FEEDBACK_LENGTH};
use webs_db::models::feedback::{CreateFeedback, Feedback};
use webs_db::repositories::FeedbackRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest accepted `page` value.
const MAX_PAGE_LENGTH: usize = 2_048;

/// POST /api/v1/feedback
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFeedback>,
) -> AppResult<(StatusCode, Json<DataResponse<Feedback>>)> {
    validate_required("message", &input.message, MAX_FEEDBACK_LENGTH)?;
    validate_rating(input.rating)?;
    if let Some(page) = &input.page {
        validate_length("page", page, MAX_PAGE_LENGTH)?;
    }

    let feedback = FeedbackRepo::create(&state.pool, &user.user_id, &input).await?;
    tracing::info!(feedback_id = %feedback.id, rating = ?feedback.rating, "Feedback received");
    Ok((StatusCode::CREATED, Json(DataResponse { data: feedback })))
}

/// GET /api/v1/feedback
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Feedback>>>> {
    let feedback =
        FeedbackRepo::list_for_user(&state.pool, &user.user_id, params.limit, params.offset)
            .await?;
    Ok(Json(DataResponse { data: feedback }))
}
