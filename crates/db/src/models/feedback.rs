//! User feedback models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use webs_core::types::{DbId, Timestamp, UserId};

/// A row from the `feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: DbId,
    pub user_id: UserId,
    pub message: String,
    pub rating: Option<i16>,
    pub page: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for submitting feedback.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedback {
    pub message: String,
    pub rating: Option<i16>,
    pub page: Option<String>,
}
