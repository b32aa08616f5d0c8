//! Entities (topics, people, organisations) extracted at final assembly.

use serde::Serialize;
use sqlx::FromRow;
use webs_core::types::{DbId, Timestamp};

/// A row from the `web_entities` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebEntity {
    pub id: DbId,
    pub web_id: DbId,
    pub name: String,
    pub entity_type: String,
    pub created_at: Timestamp,
}

/// Entity to insert during completion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntity {
    pub name: String,
    pub entity_type: String,
}
