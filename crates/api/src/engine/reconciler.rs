//! Terminal state write-back, shared by the webhook and the stream relay.
//!
//! Every terminal transition goes through [`reconcile`]:
//!
//! 1. guarded write (`PROCESSING -> COMPLETE`, `PENDING | PROCESSING -> FAILED`);
//! 2. run registry entry removed;
//! 3. `web.completed` / `web.failed` published on the event bus;
//! 4. exactly one notification attempted on a detached task. Its failure
//!    is logged and never undoes the write or fails the caller.
//!
//! A write that matches no row is a duplicate delivery and does nothing
//! else.

use serde_json::json;
use webs_core::analysis::{AnalysisResult, WorkflowOutcome};
use webs_core::notifications::{EVENT_WEB_COMPLETED, EVENT_WEB_FAILED};
use webs_core::types::DbId;
use webs_db::models::web::{CompleteWeb, Web};
use webs_db::store::StoreError;
use webs_events::{NotificationRequest, PlatformEvent};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Error recorded when the final result could not be saved.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save analysis results";

/// What a reconciliation did.
#[derive(Debug, Clone)]
pub enum Reconciled {
    /// The web moved to `COMPLETE`.
    Completed(Web),
    /// The web moved to `FAILED`.
    Failed(Web),
    /// The web was already past the source state; nothing changed.
    Duplicate,
}

impl Reconciled {
    pub fn web(&self) -> Option<&Web> {
        match self {
            Self::Completed(web) | Self::Failed(web) => Some(web),
            Self::Duplicate => None,
        }
    }
}

/// Apply a terminal outcome to a web.
///
/// If saving a successful result fails, the web is marked `FAILED`
/// instead and the original error is returned as a 500.
pub async fn reconcile(
    state: &AppState,
    web_id: DbId,
    outcome: WorkflowOutcome,
) -> AppResult<Reconciled> {
    match outcome {
        WorkflowOutcome::Success { result, raw } => {
            match save_result(state, web_id, &result, raw).await {
                Ok(Some(web)) => {
                    finish(state, &web, EVENT_WEB_COMPLETED).await;
                    Ok(Reconciled::Completed(web))
                }
                Ok(None) => {
                    tracing::info!(web_id = %web_id, "Completion ignored: web is not PROCESSING");
                    Ok(Reconciled::Duplicate)
                }
                Err(e) => {
                    tracing::error!(web_id = %web_id, error = %e, "Failed to save analysis");
                    if let Err(mark_err) = fail(state, web_id, SAVE_FAILED_MESSAGE).await {
                        tracing::error!(
                            web_id = %web_id,
                            error = %mark_err,
                            "Failed to mark web as failed",
                        );
                    }
                    Err(AppError::InternalError(format!(
                        "Failed to save analysis for web {web_id}: {e}"
                    )))
                }
            }
        }
        WorkflowOutcome::Failure { error } => fail(state, web_id, &error).await,
    }
}

/// Move a web to `FAILED` with `error`.
pub async fn fail(state: &AppState, web_id: DbId, error: &str) -> AppResult<Reconciled> {
    match state.store.mark_failed(web_id, error).await? {
        Some(web) => {
            tracing::warn!(web_id = %web_id, error = %error, "Web analysis failed");
            finish(state, &web, EVENT_WEB_FAILED).await;
            Ok(Reconciled::Failed(web))
        }
        None => {
            tracing::info!(web_id = %web_id, "Failure ignored: web is already terminal");
            Ok(Reconciled::Duplicate)
        }
    }
}

async fn save_result(
    state: &AppState,
    web_id: DbId,
    result: &AnalysisResult,
    raw: serde_json::Value,
) -> Result<Option<Web>, StoreError> {
    let web = state
        .store
        .find_web(web_id)
        .await?
        .ok_or(StoreError::WebNotFound(web_id))?;

    let update = CompleteWeb::from_analysis(result, raw, web.quick_title.as_deref(), &web.urls);
    state.store.complete_web(web_id, &update).await
}

/// Post-transition side effects.
async fn finish(state: &AppState, web: &Web, event_type: &str) {
    state.runs.remove(web.id).await;

    let title = web.display_title();
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_web(web.id)
            .with_actor(web.user_id.clone())
            .with_payload(json!({
                "status": web.status().as_str(),
                "title": title,
            })),
    );

    let request = if event_type == EVENT_WEB_COMPLETED {
        NotificationRequest::analysis_complete(web.user_id.clone(), web.id, title)
    } else {
        NotificationRequest::analysis_failed(web.user_id.clone(), web.id, title)
    };

    // Never awaited by the caller; errors are only logged.
    let notifier = state.notifier.clone();
    let web_id = web.id;
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&request).await {
            tracing::error!(
                web_id = %web_id,
                workflow = request.workflow_key,
                error = %e,
                "Notification dispatch failed",
            );
        }
    });
}
