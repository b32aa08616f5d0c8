//! Workflow engine callback: `POST /webhooks/mastra`.
//!
//! Body: `{workflowName, result, metadata: {webId, userId}}`. Every
//! validation failure answers 400 before any state is touched.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use webs_core::analysis::WorkflowOutcome;
use webs_core::error::CoreError;
use webs_core::notifications::is_known_workflow;
use webs_core::types::DbId;

use crate::auth::signature::{self, SIGNATURE_HEADER};
use crate::engine::reconciler::{self, Reconciled};
use crate::error::{AppError, AppResult};
use crate::response::WebhookAck;
use crate::state::AppState;

/// Webhook payload sent by the workflow engine when a run finishes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowWebhook {
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub metadata: WebhookMetadata,
}

/// Correlation fields echoed back from the workflow input.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMetadata {
    pub web_id: Option<String>,
    pub user_id: Option<String>,
}

/// Validated correlation of a webhook.
#[derive(Debug, PartialEq)]
pub struct WebhookTarget {
    pub web_id: DbId,
    pub user_id: String,
}

impl WorkflowWebhook {
    /// Check correlation fields and workflow name.
    pub fn validate(&self) -> Result<WebhookTarget, AppError> {
        let web_id = non_blank(self.metadata.web_id.as_deref())
            .ok_or_else(|| AppError::BadRequest("Missing webId in metadata".into()))?;
        let user_id = non_blank(self.metadata.user_id.as_deref())
            .ok_or_else(|| AppError::BadRequest("Missing userId in metadata".into()))?;
        let web_id: DbId = web_id
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid webId '{web_id}'")))?;

        let workflow_name = self.workflow_name.as_deref().unwrap_or_default();
        if !is_known_workflow(workflow_name) {
            tracing::warn!(workflow_name = %workflow_name, web_id = %web_id, "Unknown workflow in webhook");
            return Err(AppError::BadRequest(format!(
                "Unknown workflow '{workflow_name}'"
            )));
        }

        Ok(WebhookTarget {
            web_id,
            user_id: user_id.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// POST /webhooks/mastra
pub async fn mastra(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    if let Some(secret) = state.config.webhook_secret.as_deref() {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        if !signature::verify(secret, &body, header) {
            tracing::warn!("Rejected webhook with missing or invalid signature");
            return Err(CoreError::Unauthorized("Invalid webhook signature".into()).into());
        }
    }

    let payload: WorkflowWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook body: {e}")))?;
    let target = payload.validate()?;

    let outcome = WorkflowOutcome::from_value(&payload.result);
    tracing::info!(
        web_id = %target.web_id,
        success = matches!(outcome, WorkflowOutcome::Success { .. }),
        "Workflow webhook received",
    );

    let reconciled = reconciler::reconcile(&state, target.web_id, outcome).await?;

    if let Some(web) = reconciled.web() {
        if web.user_id != target.user_id {
            tracing::warn!(
                web_id = %web.id,
                owner = %web.user_id,
                webhook_user = %target.user_id,
                "Webhook userId does not match the web owner; notified the owner",
            );
        }
    }

    let message = match reconciled {
        Reconciled::Completed(_) => "Analysis saved",
        Reconciled::Failed(_) => "Failure recorded",
        Reconciled::Duplicate => "Web already finalized",
    };
    Ok(Json(WebhookAck::ok(message)))
}
