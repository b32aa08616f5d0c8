//! Repository for the `spaces` table.

use sqlx::PgPool;
use webs_core::types::{new_id, DbId};

use crate::models::space::{CreateSpace, Space, UpdateSpace};

const COLUMNS: &str = "id, user_id, name, description, emoji, created_at, updated_at";

/// Provides CRUD operations for spaces.
pub struct SpaceRepo;

impl SpaceRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        input: &CreateSpace,
    ) -> Result<Space, sqlx::Error> {
        let query = format!(
            "INSERT INTO spaces (id, user_id, name, description, emoji) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(new_id())
            .bind(user_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.emoji)
            .fetch_one(pool)
            .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
    ) -> Result<Option<Space>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spaces WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's spaces alphabetically.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Space>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spaces WHERE user_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Space>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a space. Returns `None` if it is not the user's.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: &str,
        input: &UpdateSpace,
    ) -> Result<Option<Space>, sqlx::Error> {
        let query = format!(
            "UPDATE spaces SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                emoji = COALESCE($5, emoji), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Space>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.emoji)
            .fetch_optional(pool)
            .await
    }

    /// Delete a space. Its webs are detached (`space_id` set to NULL).
    pub async fn delete(pool: &PgPool, id: DbId, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM spaces WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
