//! Starting the `analyzeWeb` workflow for a `PENDING` web.

use serde_json::json;
use webs_core::error::CoreError;
use webs_core::notifications::WORKFLOW_ANALYZE_WEB;
use webs_db::models::status::WebStatus;
use webs_db::models::web::Web;
use webs_mastra::MastraError;

use crate::engine::reconciler::{self, Reconciled};
use crate::error::AppResult;
use crate::state::AppState;

/// Workflow input: `{urls, prompt, webId, userId}`. `webId` is the
/// correlation id echoed back in the webhook metadata.
pub fn workflow_input(web: &Web) -> serde_json::Value {
    json!({
        "urls": web.urls,
        "prompt": web.prompt,
        "webId": web.id,
        "userId": web.user_id,
    })
}

/// Trigger the workflow and move the web to `PROCESSING`.
///
/// Fails with 409 unless the web is `PENDING`. The run is created, the
/// web is moved to `PROCESSING` with its run id, and only then is the run
/// started, so a callback for the run always finds the web `PROCESSING`.
/// If the engine cannot create or start the run, the web is marked
/// `FAILED` (with the usual failure notification) and returned; there is
/// no retry.
pub async fn start_analysis(state: &AppState, web: Web) -> AppResult<Web> {
    if web.status() != WebStatus::Pending {
        return Err(CoreError::Conflict(format!(
            "Web {} is already {}",
            web.id,
            web.status()
        ))
        .into());
    }

    let run_id = match state.workflows.create_run(WORKFLOW_ANALYZE_WEB).await {
        Ok(run_id) => run_id,
        Err(e) => return failed_to_start(state, web, &e).await,
    };

    let Some(processing) = state.store.mark_processing(web.id, &run_id).await? else {
        // Another request moved the web on between our read and write.
        tracing::warn!(web_id = %web.id, run_id = %run_id, "Web left PENDING before the run was recorded");
        return Err(CoreError::Conflict(format!("Web {} is no longer pending", web.id)).into());
    };
    state.runs.insert(web.id, run_id.clone()).await;

    let input = workflow_input(&processing);
    if let Err(e) = state
        .workflows
        .start_run(WORKFLOW_ANALYZE_WEB, &run_id, &input)
        .await
    {
        return failed_to_start(state, processing, &e).await;
    }

    tracing::info!(web_id = %web.id, run_id = %run_id, "Workflow started");
    Ok(processing)
}

async fn failed_to_start(state: &AppState, web: Web, error: &MastraError) -> AppResult<Web> {
    tracing::error!(web_id = %web.id, error = %error, "Failed to start workflow");
    let message = format!("Failed to start analysis: {error}");
    Ok(match reconciler::fail(state, web.id, &message).await? {
        Reconciled::Failed(failed) => failed,
        _ => current(state, web).await?,
    })
}

async fn current(state: &AppState, fallback: Web) -> AppResult<Web> {
    Ok(state.store.find_web(fallback.id).await?.unwrap_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn input_carries_correlation_fields() {
        let now = Utc::now();
        let web = Web {
            id: webs_core::types::new_id(),
            user_id: "user_1".into(),
            space_id: None,
            urls: vec!["https://example.com".into()],
            prompt: Some("focus on pricing".into()),
            status_id: WebStatus::Pending.id(),
            run_id: None,
            quick_title: None,
            quick_emoji: None,
            quick_description: None,
            suggested_topics: vec![],
            title: None,
            emoji: None,
            description: None,
            topics: vec![],
            sentiment: None,
            confidence: None,
            insights: vec![],
            related_urls: vec![],
            analysis: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let input = workflow_input(&web);
        assert_eq!(input["urls"][0], "https://example.com");
        assert_eq!(input["prompt"], "focus on pricing");
        assert_eq!(input["webId"], web.id.to_string());
        assert_eq!(input["userId"], "user_1");
    }
}
