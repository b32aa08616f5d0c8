//! Handlers for the `/spaces` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use webs_core::error::CoreError;
use webs_core::types::DbId;
use webs_core::validation::{
    validate_emoji, validate_length, validate_required, MAX_DESCRIPTION_LENGTH,
    MAX_SPACE_NAME_LENGTH,
};
use webs_db::models::space::{CreateSpace, Space, UpdateSpace};
use webs_db::repositories::SpaceRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_optional_fields(
    description: Option<&str>,
    emoji: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(description) = description {
        validate_length("description", description, MAX_DESCRIPTION_LENGTH)?;
    }
    if let Some(emoji) = emoji {
        validate_emoji(emoji)?;
    }
    Ok(())
}

/// GET /api/v1/spaces
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Space>>>> {
    let spaces = SpaceRepo::list_for_user(&state.pool, &user.user_id).await?;
    Ok(Json(DataResponse { data: spaces }))
}

/// POST /api/v1/spaces
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSpace>,
) -> AppResult<(StatusCode, Json<DataResponse<Space>>)> {
    validate_required("name", &input.name, MAX_SPACE_NAME_LENGTH)?;
    validate_optional_fields(input.description.as_deref(), input.emoji.as_deref())?;

    let space = SpaceRepo::create(&state.pool, &user.user_id, &input).await?;
    tracing::info!(space_id = %space.id, user_id = %user.user_id, "Space created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: space })))
}

/// GET /api/v1/spaces/{id}
pub async fn get_by_id(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Space>>> {
    let space = SpaceRepo::find_for_user(&state.pool, id, &user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Space", id)))?;
    Ok(Json(DataResponse { data: space }))
}

/// PATCH /api/v1/spaces/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSpace>,
) -> AppResult<Json<DataResponse<Space>>> {
    if let Some(name) = &input.name {
        validate_required("name", name, MAX_SPACE_NAME_LENGTH)?;
    }
    validate_optional_fields(input.description.as_deref(), input.emoji.as_deref())?;

    let space = SpaceRepo::update(&state.pool, id, &user.user_id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Space", id)))?;
    Ok(Json(DataResponse { data: space }))
}

/// DELETE /api/v1/spaces/{id}
///
/// Webs in the space are kept and become unfiled.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SpaceRepo::delete(&state.pool, id, &user.user_id).await? {
        return Err(AppError::Core(CoreError::not_found("Space", id)));
    }
    tracing::info!(space_id = %id, "Space deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_checked_only_when_present() {
        assert!(validate_optional_fields(None, None).is_ok());
        assert!(validate_optional_fields(Some("Reading list"), Some("📚")).is_ok());
        assert!(validate_optional_fields(None, Some("books")).is_err());

        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_optional_fields(Some(&long), None).is_err());
    }
}
