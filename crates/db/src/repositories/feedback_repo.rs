//! Repository for the `feedback` table.

use sqlx::PgPool;
use webs_core::types::new_id;

use crate::models::feedback::{CreateFeedback, Feedback};
use crate::repositories::{clamp_limit, clamp_offset};

const COLUMNS: &str = "id, user_id, message, rating, page, created_at";

/// Insert and list user feedback.
pub struct FeedbackRepo;

impl FeedbackRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        input: &CreateFeedback,
    ) -> Result<Feedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO feedback (id, user_id, message, rating, page) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(new_id())
            .bind(user_id)
            .bind(input.message.trim())
            .bind(input.rating)
            .bind(&input.page)
            .fetch_one(pool)
            .await
    }

    /// A user's own feedback, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedback WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(user_id)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }
}
