//! Handlers for the `/webs` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use webs_core::error::CoreError;
use webs_core::types::DbId;
use webs_core::validation::{normalize_prompt, normalize_urls, validate_emoji};
use webs_db::models::entity::WebEntity;
use webs_db::models::web::{CreateWebRequest, NewWeb, UpdateWebEmoji, Web, WebListParams};
use webs_db::repositories::{EntityRepo, SpaceRepo, WebRepo};

use crate::engine::trigger;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a web owned by `user_id`. Foreign webs answer 404, same as
/// missing ones.
pub(crate) async fn load_owned_web(state: &AppState, id: DbId, user_id: &str) -> AppResult<Web> {
    state
        .store
        .find_web(id)
        .await?
        .filter(|web| web.user_id == user_id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Web", id)))
}

/// Reject a `space_id` that is not one of the user's spaces.
pub(crate) async fn ensure_space(state: &AppState, space_id: DbId, user_id: &str) -> AppResult<()> {
    SpaceRepo::find_for_user(&state.pool, space_id, user_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Core(CoreError::not_found("Space", space_id)))
}

/// GET /api/v1/webs
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WebListParams>,
) -> AppResult<Json<DataResponse<Vec<Web>>>> {
    let webs = WebRepo::list_for_user(&state.pool, &user.user_id, &params).await?;
    Ok(Json(DataResponse { data: webs }))
}

/// POST /api/v1/webs
///
/// Creates a `PENDING` web and starts its analysis right away. The
/// response carries the web as it stands after the trigger: normally
/// `PROCESSING`, or `FAILED` if the engine could not be reached.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWebRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Web>>)> {
    let urls = normalize_urls(input.url.as_deref(), input.urls.as_deref())?;
    let prompt = normalize_prompt(input.prompt.as_deref())?;
    if let Some(space_id) = input.space_id {
        ensure_space(&state, space_id, &user.user_id).await?;
    }

    let web = state
        .store
        .create_web(NewWeb {
            user_id: user.user_id.clone(),
            urls,
            prompt,
            space_id: input.space_id,
        })
        .await?;
    tracing::info!(web_id = %web.id, user_id = %user.user_id, urls = web.urls.len(), "Web created");

    let web = trigger::start_analysis(&state, web).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: web })))
}

/// GET /api/v1/webs/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Web>>> {
    let web = load_owned_web(&state, id, &user.user_id).await?;
    Ok(Json(DataResponse { data: web }))
}

/// PATCH /api/v1/webs/{id}
///
/// Only the emoji is user-editable.
pub async fn update_emoji(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWebEmoji>,
) -> AppResult<Json<DataResponse<Web>>> {
    validate_emoji(&input.emoji)?;
    let web = WebRepo::update_emoji(&state.pool, id, &user.user_id, input.emoji.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Web", id)))?;
    Ok(Json(DataResponse { data: web }))
}

/// DELETE /api/v1/webs/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = WebRepo::delete(&state.pool, id, &user.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::not_found("Web", id)));
    }
    state.runs.remove(id).await;
    tracing::info!(web_id = %id, "Web deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/webs/{id}/analyze
///
/// 409 unless the web is `PENDING`.
pub async fn analyze(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Web>>> {
    let web = load_owned_web(&state, id, &user.user_id).await?;
    let web = trigger::start_analysis(&state, web).await?;
    Ok(Json(DataResponse { data: web }))
}

/// GET /api/v1/webs/{id}/entities
pub async fn list_entities(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<WebEntity>>>> {
    load_owned_web(&state, id, &user.user_id).await?;
    let entities = EntityRepo::list_for_web(&state.pool, id).await?;
    Ok(Json(DataResponse { data: entities }))
}
