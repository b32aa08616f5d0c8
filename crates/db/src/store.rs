//! The persistence seam used by the workflow trigger, relay and reconciler.
//!
//! Every status change is a guarded compare-and-set: the `UPDATE` only
//! matches rows whose current status may legally move to the target
//! status (see [`WebStatus::allowed_sources`]). A write that matches no
//! row returns `Ok(None)`, which callers treat as "someone else already
//! moved this web on" rather than as an error.

use async_trait::async_trait;
use sqlx::PgPool;
use webs_core::types::DbId;

use crate::models::status::WebStatus;
use crate::models::web::{CompleteWeb, NewWeb, QuickMetadataUpdate, Web};
use crate::repositories::web_repo::WEB_COLUMNS;
use crate::repositories::{EntityRepo, WebRepo};

/// Errors from the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Web {0} not found")]
    WebNotFound(DbId),
}

/// State transitions and lookups of webs.
#[async_trait]
pub trait WebStore: Send + Sync {
    /// Insert a new `PENDING` web.
    async fn create_web(&self, input: NewWeb) -> Result<Web, StoreError>;

    /// Fetch a web regardless of owner.
    async fn find_web(&self, web_id: DbId) -> Result<Option<Web>, StoreError>;

    /// `PENDING -> PROCESSING`, recording the run id.
    async fn mark_processing(&self, web_id: DbId, run_id: &str)
        -> Result<Option<Web>, StoreError>;

    /// Write quick metadata while the web is `PROCESSING`.
    ///
    /// Returns `false` when the web is in any other state.
    async fn save_quick_metadata(
        &self,
        web_id: DbId,
        quick: &QuickMetadataUpdate,
    ) -> Result<bool, StoreError>;

    /// `PROCESSING -> COMPLETE` with the final fields. Entities are
    /// replaced in the same transaction.
    ///
    /// Fails with [`StoreError::WebNotFound`] when the web does not exist.
    async fn complete_web(
        &self,
        web_id: DbId,
        update: &CompleteWeb,
    ) -> Result<Option<Web>, StoreError>;

    /// `PENDING | PROCESSING -> FAILED`. Quick metadata is kept.
    async fn mark_failed(&self, web_id: DbId, error: &str) -> Result<Option<Web>, StoreError>;
}

/// [`WebStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgWebStore {
    pool: PgPool,
}

impl PgWebStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebStore for PgWebStore {
    async fn create_web(&self, input: NewWeb) -> Result<Web, StoreError> {
        Ok(WebRepo::create(&self.pool, &input).await?)
    }

    async fn find_web(&self, web_id: DbId) -> Result<Option<Web>, StoreError> {
        Ok(WebRepo::find_by_id(&self.pool, web_id).await?)
    }

    async fn mark_processing(
        &self,
        web_id: DbId,
        run_id: &str,
    ) -> Result<Option<Web>, StoreError> {
        let query = format!(
            "UPDATE webs SET status_id = $2, run_id = $3, updated_at = now() \
             WHERE id = $1 AND status_id = ANY($4) \
             RETURNING {WEB_COLUMNS}"
        );
        let web = sqlx::query_as::<_, Web>(&query)
            .bind(web_id)
            .bind(WebStatus::Processing.id())
            .bind(run_id)
            .bind(WebStatus::allowed_sources(WebStatus::Processing))
            .fetch_optional(&self.pool)
            .await?;
        Ok(web)
    }

    async fn save_quick_metadata(
        &self,
        web_id: DbId,
        quick: &QuickMetadataUpdate,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE webs SET \
                quick_title = COALESCE($3, quick_title), \
                quick_emoji = COALESCE($4, quick_emoji), \
                quick_description = COALESCE($5, quick_description), \
                suggested_topics = CASE WHEN cardinality($6::text[]) > 0 \
                                        THEN $6 ELSE suggested_topics END, \
                updated_at = now() \
             WHERE id = $1 AND status_id = $2",
        )
        .bind(web_id)
        .bind(WebStatus::Processing.id())
        .bind(&quick.quick_title)
        .bind(&quick.quick_emoji)
        .bind(&quick.quick_description)
        .bind(&quick.suggested_topics)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete_web(
        &self,
        web_id: DbId,
        update: &CompleteWeb,
    ) -> Result<Option<Web>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE webs SET \
                status_id = $2, \
                title = $3, \
                emoji = COALESCE(emoji, $4, quick_emoji), \
                description = $5, \
                topics = $6, \
                sentiment = $7, \
                confidence = $8, \
                insights = $9, \
                related_urls = $10, \
                analysis = $11, \
                error_message = NULL, \
                completed_at = now(), \
                updated_at = now() \
             WHERE id = $1 AND status_id = ANY($12) \
             RETURNING {WEB_COLUMNS}"
        );
        let web = sqlx::query_as::<_, Web>(&query)
            .bind(web_id)
            .bind(WebStatus::Complete.id())
            .bind(&update.title)
            .bind(&update.emoji)
            .bind(&update.description)
            .bind(&update.topics)
            .bind(&update.sentiment)
            .bind(update.confidence)
            .bind(&update.insights)
            .bind(&update.related_urls)
            .bind(&update.analysis)
            .bind(WebStatus::allowed_sources(WebStatus::Complete))
            .fetch_optional(&mut *tx)
            .await?;

        let Some(web) = web else {
            tx.rollback().await?;
            return match WebRepo::find_by_id(&self.pool, web_id).await? {
                Some(_) => Ok(None),
                None => Err(StoreError::WebNotFound(web_id)),
            };
        };

        let inserted = EntityRepo::replace_for_web(&mut tx, web_id, &update.entities).await?;
        tx.commit().await?;

        tracing::debug!(web_id = %web_id, entities = inserted, "Web completed");
        Ok(Some(web))
    }

    async fn mark_failed(&self, web_id: DbId, error: &str) -> Result<Option<Web>, StoreError> {
        let query = format!(
            "UPDATE webs SET status_id = $2, error_message = $3, \
                completed_at = now(), updated_at = now() \
             WHERE id = $1 AND status_id = ANY($4) \
             RETURNING {WEB_COLUMNS}"
        );
        let web = sqlx::query_as::<_, Web>(&query)
            .bind(web_id)
            .bind(WebStatus::Failed.id())
            .bind(error)
            .bind(WebStatus::allowed_sources(WebStatus::Failed))
            .fetch_optional(&self.pool)
            .await?;
        Ok(web)
    }
}
