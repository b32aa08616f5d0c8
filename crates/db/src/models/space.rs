//! Space models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use webs_core::types::{DbId, Timestamp, UserId};

/// A row from the `spaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Space {
    pub id: DbId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a space.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpace {
    pub name: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
}

/// DTO for updating a space. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSpace {
    pub name: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
}
