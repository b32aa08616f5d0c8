//! Repository for the `webs` table: user-facing CRUD.
//!
//! Status transitions are not performed here; they go through
//! [`crate::store::WebStore`] so the workflow paths share one guarded
//! implementation.

use sqlx::PgPool;
use webs_core::types::{new_id, DbId};

use crate::models::status::WebStatus;
use crate::models::web::{NewWeb, Web, WebListParams};
use crate::repositories::{clamp_limit, clamp_offset};

/// Column list for `webs` queries.
pub(crate) const WEB_COLUMNS: &str = "\
    id, user_id, space_id, urls, prompt, status_id, run_id, \
    quick_title, quick_emoji, quick_description, suggested_topics, \
    title, emoji, description, topics, sentiment, confidence, insights, \
    related_urls, analysis, error_message, created_at, updated_at, completed_at";

/// Provides CRUD operations for webs.
pub struct WebRepo;

impl WebRepo {
    /// Insert a new `PENDING` web.
    pub async fn create(pool: &PgPool, input: &NewWeb) -> Result<Web, sqlx::Error> {
        let query = format!(
            "INSERT INTO webs (id, user_id, space_id, urls, prompt, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {WEB_COLUMNS}"
        );
        sqlx::query_as::<_, Web>(&query)
            .bind(new_id())
            .bind(&input.user_id)
            .bind(input.space_id)
            .bind(&input.urls)
            .bind(&input.prompt)
            .bind(WebStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Find a web by id regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Web>, sqlx::Error> {
        let query = format!("SELECT {WEB_COLUMNS} FROM webs WHERE id = $1");
        sqlx::query_as::<_, Web>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a web owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<Web>, sqlx::Error> {
        let query = format!("SELECT {WEB_COLUMNS} FROM webs WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Web>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's webs, newest first, optionally filtered by space.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        params: &WebListParams,
    ) -> Result<Vec<Web>, sqlx::Error> {
        let limit = clamp_limit(params.limit);
        let offset = clamp_offset(params.offset);

        let query = format!(
            "SELECT {WEB_COLUMNS} FROM webs \
             WHERE user_id = $1 AND ($2::uuid IS NULL OR space_id = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Web>(&query)
            .bind(user_id)
            .bind(params.space_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set the user-chosen emoji. Returns `None` if the web is not the user's.
    pub async fn update_emoji(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
        emoji: &str,
    ) -> Result<Option<Web>, sqlx::Error> {
        let query = format!(
            "UPDATE webs SET emoji = $3, updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {WEB_COLUMNS}"
        );
        sqlx::query_as::<_, Web>(&query)
            .bind(id)
            .bind(user_id)
            .bind(emoji)
            .fetch_optional(pool)
            .await
    }

    /// Delete a web. Entities and messages cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
