//! Per-user settings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use webs_core::types::{DbId, Timestamp, UserId};

/// Theme applied when a user has never saved settings.
pub const DEFAULT_THEME: &str = "system";

/// A row from the `user_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSettings {
    pub user_id: UserId,
    pub theme: String,
    pub email_notifications: bool,
    pub in_app_notifications: bool,
    pub default_space_id: Option<DbId>,
    pub updated_at: Timestamp,
}

impl UserSettings {
    /// Settings reported for a user with no stored row.
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            theme: DEFAULT_THEME.to_string(),
            email_notifications: true,
            in_app_notifications: true,
            default_space_id: None,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// DTO for `PATCH /settings`. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserSettings {
    pub theme: Option<String>,
    pub email_notifications: Option<bool>,
    pub in_app_notifications: Option<bool>,
    pub default_space_id: Option<DbId>,
}
