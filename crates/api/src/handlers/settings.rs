//! Handlers for the caller's `/settings`.

use axum::extract::State;
use axum::Json;
use webs_core::validation::{validate_one_of, VALID_THEMES};
use webs_db::models::settings::{UpdateUserSettings, UserSettings};
use webs_db::repositories::UserSettingsRepo;

use crate::error::AppResult;
use crate::handlers::webs::ensure_space;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
///
/// Users who never saved settings get the defaults.
pub async fn get(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserSettings>>> {
    let settings = UserSettingsRepo::find(&state.pool, &user.user_id)
        .await?
        .unwrap_or_else(|| UserSettings::defaults_for(&user.user_id));
    Ok(Json(DataResponse { data: settings }))
}

/// PATCH /api/v1/settings
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateUserSettings>,
) -> AppResult<Json<DataResponse<UserSettings>>> {
    if let Some(theme) = &input.theme {
        validate_one_of("theme", theme, VALID_THEMES)?;
    }
    if let Some(space_id) = input.default_space_id {
        ensure_space(&state, space_id, &user.user_id).await?;
    }

    let settings = UserSettingsRepo::upsert(&state.pool, &user.user_id, &input).await?;
    Ok(Json(DataResponse { data: settings }))
}
