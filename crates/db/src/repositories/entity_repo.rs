//! Repository for the `web_entities` table.

use sqlx::{PgPool, Postgres, Transaction};
use webs_core::types::{new_id, DbId};

use crate::models::entity::{NewEntity, WebEntity};

const COLUMNS: &str = "id, web_id, name, entity_type, created_at";

/// Provides read access and wholesale replacement of a web's entities.
pub struct EntityRepo;

impl EntityRepo {
    /// List a web's entities in insertion order.
    pub async fn list_for_web(pool: &PgPool, web_id: DbId) -> Result<Vec<WebEntity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM web_entities WHERE web_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, WebEntity>(&query)
            .bind(web_id)
            .fetch_all(pool)
            .await
    }

    /// Delete every entity of `web_id` and insert `entities` in their place.
    ///
    /// Runs inside the caller's transaction so the replacement commits
    /// together with the status write.
    pub async fn replace_for_web(
        tx: &mut Transaction<'_, Postgres>,
        web_id: DbId,
        entities: &[NewEntity],
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM web_entities WHERE web_id = $1")
            .bind(web_id)
            .execute(&mut **tx)
            .await?;

        if entities.is_empty() {
            return Ok(0);
        }

        let ids: Vec<DbId> = entities.iter().map(|_| new_id()).collect();
        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        let types: Vec<&str> = entities.iter().map(|e| e.entity_type.as_str()).collect();

        let result = sqlx::query(
            "INSERT INTO web_entities (id, web_id, name, entity_type) \
             SELECT id, $2, name, entity_type \
             FROM UNNEST($1::uuid[], $3::text[], $4::text[]) AS t(id, name, entity_type)",
        )
        .bind(&ids)
        .bind(web_id)
        .bind(&names)
        .bind(&types)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
