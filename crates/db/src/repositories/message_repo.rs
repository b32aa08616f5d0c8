//! Repository for the `web_messages` table.

use sqlx::PgPool;
use webs_core::types::{new_id, DbId};

use crate::models::message::{CreateMessage, WebMessage};

const COLUMNS: &str = "id, web_id, role, content, created_at";

/// Append, list and replace-all for a web's message log.
pub struct MessageRepo;

impl MessageRepo {
    pub async fn list_for_web(pool: &PgPool, web_id: DbId) -> Result<Vec<WebMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM web_messages WHERE web_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, WebMessage>(&query)
            .bind(web_id)
            .fetch_all(pool)
            .await
    }

    pub async fn append(
        pool: &PgPool,
        web_id: DbId,
        input: &CreateMessage,
    ) -> Result<WebMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO web_messages (id, web_id, role, content) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WebMessage>(&query)
            .bind(new_id())
            .bind(web_id)
            .bind(&input.role)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Replace the whole log in one transaction.
    ///
    /// Messages get strictly increasing `created_at` values so the given
    /// order survives the `ORDER BY created_at` in [`Self::list_for_web`].
    pub async fn replace_all(
        pool: &PgPool,
        web_id: DbId,
        messages: &[CreateMessage],
    ) -> Result<Vec<WebMessage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM web_messages WHERE web_id = $1")
            .bind(web_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO web_messages (id, web_id, role, content, created_at) \
             VALUES ($1, $2, $3, $4, now() + make_interval(secs => $5::double precision / 1000000)) \
             RETURNING {COLUMNS}"
        );

        let mut inserted = Vec::with_capacity(messages.len());
        for (i, message) in messages.iter().enumerate() {
            let row = sqlx::query_as::<_, WebMessage>(&query)
                .bind(new_id())
                .bind(web_id)
                .bind(&message.role)
                .bind(&message.content)
                .bind(i as i64)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
