//! Repository for the `user_settings` table.

use sqlx::PgPool;

use crate::models::settings::{UpdateUserSettings, UserSettings, DEFAULT_THEME};

const COLUMNS: &str =
    "user_id, theme, email_notifications, in_app_notifications, default_space_id, updated_at";

/// Read and upsert per-user settings.
pub struct UserSettingsRepo;

impl UserSettingsRepo {
    /// Stored settings, or `None` if the user never saved any.
    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<UserSettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE user_id = $1");
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or patch a user's settings. Omitted fields keep their
    /// current value, or the default on first write.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        input: &UpdateUserSettings,
    ) -> Result<UserSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_settings \
                (user_id, theme, email_notifications, in_app_notifications, default_space_id) \
             VALUES ($1, COALESCE($2, $6), COALESCE($3, true), COALESCE($4, true), $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                theme = COALESCE($2, user_settings.theme), \
                email_notifications = COALESCE($3, user_settings.email_notifications), \
                in_app_notifications = COALESCE($4, user_settings.in_app_notifications), \
                default_space_id = COALESCE($5, user_settings.default_space_id), \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .bind(&input.theme)
            .bind(input.email_notifications)
            .bind(input.in_app_notifications)
            .bind(input.default_space_id)
            .bind(DEFAULT_THEME)
            .fetch_one(pool)
            .await
    }
}
