//! Chat-style message log attached to a Web.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use webs_core::types::{DbId, Timestamp};

/// A row from the `web_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebMessage {
    pub id: DbId,
    pub web_id: DbId,
    pub role: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// Body of `POST /webs/{id}/messages`, and one item of a replace.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessage {
    pub role: String,
    pub content: String,
}

/// Body of `PUT /webs/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceMessages {
    pub messages: Vec<CreateMessage>,
}
