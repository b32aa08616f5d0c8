//! Handlers for a web's message log (`/webs/{id}/messages`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use webs_core::error::CoreError;
use webs_core::types::DbId;
use webs_core::validation::{validate_one_of, validate_required, MAX_MESSAGE_LENGTH, VALID_MESSAGE_ROLES};
use webs_db::models::message::{CreateMessage, ReplaceMessages, WebMessage};
use webs_db::repositories::MessageRepo;

use crate::error::AppResult;
use crate::handlers::webs::load_owned_web;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_message(message: &CreateMessage) -> Result<(), CoreError> {
    validate_one_of("role", &message.role, VALID_MESSAGE_ROLES)?;
    validate_required("content", &message.content, MAX_MESSAGE_LENGTH)
}

/// GET /api/v1/webs/{id}/messages
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<WebMessage>>>> {
    load_owned_web(&state, id, &user.user_id).await?;
    let messages = MessageRepo::list_for_web(&state.pool, id).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// POST /api/v1/webs/{id}/messages
pub async fn append(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<WebMessage>>)> {
    validate_message(&input)?;
    load_owned_web(&state, id, &user.user_id).await?;
    let message = MessageRepo::append(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// PUT /api/v1/webs/{id}/messages
///
/// Replaces the whole log, keeping the given order.
pub async fn replace(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceMessages>,
) -> AppResult<Json<DataResponse<Vec<WebMessage>>>> {
    for message in &input.messages {
        validate_message(message)?;
    }
    load_owned_web(&state, id, &user.user_id).await?;
    let messages = MessageRepo::replace_all(&state.pool, id, &input.messages).await?;
    Ok(Json(DataResponse { data: messages }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_validation() {
        let ok = CreateMessage {
            role: "user".into(),
            content: "What is this page about?".into(),
        };
        assert!(validate_message(&ok).is_ok());

        let bad_role = CreateMessage {
            role: "robot".into(),
            content: "hi".into(),
        };
        assert!(validate_message(&bad_role).is_err());

        let blank = CreateMessage {
            role: "assistant".into(),
            content: "   ".into(),
        };
        assert!(validate_message(&blank).is_err());
    }
}
