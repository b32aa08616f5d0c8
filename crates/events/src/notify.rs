//! The outbound notification seam.
//!
//! The reconciler sends exactly one notification per terminal transition.
//! Callers log and swallow [`NotifyError`]; a failed notification never
//! undoes the status write that caused it.

use async_trait::async_trait;
use serde::Serialize;
use webs_core::notifications::{NOTIFY_ANALYSIS_COMPLETE, NOTIFY_ANALYSIS_FAILED};
use webs_core::types::{DbId, UserId};

/// Errors from a notification provider.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Notification provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
}

/// Data attached to every analysis notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub web_id: DbId,
    pub title: String,
    pub status: String,
}

/// One notification to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    /// Provider workflow key, e.g. `web-analysis-complete`.
    pub workflow_key: &'static str,
    pub recipient: UserId,
    pub data: NotificationData,
}

impl NotificationRequest {
    /// Notification for a web that reached `COMPLETE`.
    pub fn analysis_complete(recipient: impl Into<UserId>, web_id: DbId, title: String) -> Self {
        Self {
            workflow_key: NOTIFY_ANALYSIS_COMPLETE,
            recipient: recipient.into(),
            data: NotificationData {
                web_id,
                title,
                status: "COMPLETE".to_string(),
            },
        }
    }

    /// Notification for a web that reached `FAILED`.
    pub fn analysis_failed(recipient: impl Into<UserId>, web_id: DbId, title: String) -> Self {
        Self {
            workflow_key: NOTIFY_ANALYSIS_FAILED,
            recipient: recipient.into(),
            data: NotificationData {
                web_id,
                title,
                status: "FAILED".to_string(),
            },
        }
    }
}

/// Sends user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError>;
}
