//! `/api/v1/webs` over the in-memory store and scripted engine.

mod common;

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use common::{body_json, build_test_app, build_test_app_with, sample_web, test_config, OTHER_USER, USER};
use serde_json::json;
use webs_core::types::DbId;
use webs_db::models::status::WebStatus;

#[tokio::test]
async fn create_starts_analysis() {
    let app = build_test_app();
    let response = app
        .post_json(
            "/api/v1/webs",
            Some(USER),
            &json!({"url": "https://example.com", "prompt": "focus on pricing"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "PROCESSING");
    assert_eq!(json["data"]["run_id"], "run-1");
    assert_eq!(json["data"]["user_id"], USER);

    let id: DbId = json["data"]["id"].as_str().unwrap().parse().unwrap();
    assert_eq!(app.state.runs.get(id).await.as_deref(), Some("run-1"));

    let inputs = app.workflows.started_inputs();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0]["webId"], id.to_string());
    assert_eq!(inputs[0]["userId"], USER);
    assert_eq!(inputs[0]["urls"], json!(["https://example.com"]));
    assert_eq!(inputs[0]["prompt"], "focus on pricing");
}

#[tokio::test]
async fn trigger_failure_marks_web_failed() {
    let app = build_test_app();
    app.workflows.fail_trigger.store(true, Ordering::SeqCst);

    let response = app
        .post_json("/api/v1/webs", Some(USER), &json!({"url": "https://example.com"}))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "FAILED");
    assert!(json["data"]["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to start analysis"));

    let sent = app.notifier.wait_for_sent(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].workflow_key, "web-analysis-failed");
    assert_eq!(sent[0].recipient, USER);
}

#[tokio::test]
async fn web_is_processing_before_the_run_starts() {
    let app = build_test_app();
    let response = app
        .post_json("/api/v1/webs", Some(USER), &json!({"url": "https://example.com"}))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(app.workflows.status_at_start(), vec![Some(WebStatus::Processing)]);
}

#[tokio::test]
async fn start_failure_after_run_creation_marks_web_failed() {
    let app = build_test_app();
    app.workflows.fail_start.store(true, Ordering::SeqCst);

    let response = app
        .post_json("/api/v1/webs", Some(USER), &json!({"url": "https://example.com"}))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "FAILED");
    assert_eq!(json["data"]["run_id"], "run-1");
    let id: DbId = json["data"]["id"].as_str().unwrap().parse().unwrap();
    assert!(app.state.runs.get(id).await.is_none());
    assert_eq!(
        app.notifier.wait_for_sent(1).await[0].workflow_key,
        "web-analysis-failed"
    );
}

#[tokio::test]
async fn trigger_failure_answers_before_a_slow_notifier() {
    let mut config = test_config();
    config.request_timeout_secs = 1;
    let app = build_test_app_with(config);
    app.workflows.fail_trigger.store(true, Ordering::SeqCst);
    app.notifier.set_delay(std::time::Duration::from_secs(2));
    app.notifier.fail.store(true, Ordering::SeqCst);

    let response = app
        .post_json("/api/v1/webs", Some(USER), &json!({"url": "https://example.com"}))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["status"], "FAILED");
    assert_eq!(app.notifier.wait_for_sent(1).await.len(), 1);
}

#[tokio::test]
async fn invalid_url_is_rejected_without_writing() {
    let app = build_test_app();
    let response = app
        .post_json("/api/v1/webs", Some(USER), &json!({"url": "not a url"}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(app.store.len(), 0);
    assert!(app.workflows.started_inputs().is_empty());
}

#[tokio::test]
async fn missing_urls_are_rejected() {
    let app = build_test_app();
    let response = app.post_json("/api/v1/webs", Some(USER), &json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.store.len(), 0);
}

#[tokio::test]
async fn analyze_pending_web() {
    let app = build_test_app();
    let web = app.seed_web(sample_web(USER, WebStatus::Pending), None).await;

    let response = app
        .post_json(&format!("/api/v1/webs/{}/analyze", web.id), Some(USER), &json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "PROCESSING");
    assert_eq!(app.store.get(web.id).unwrap().status(), WebStatus::Processing);
}

#[tokio::test]
async fn analyze_twice_conflicts() {
    let app = build_test_app();
    let created = body_json(
        app.post_json("/api/v1/webs", Some(USER), &json!({"url": "https://example.com"}))
            .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let response = app
        .post_json(&format!("/api/v1/webs/{id}/analyze"), Some(USER), &json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.workflows.started_inputs().len(), 1);
}

#[tokio::test]
async fn foreign_web_is_not_found() {
    let app = build_test_app();
    let web = app.seed_web(sample_web(USER, WebStatus::Complete), None).await;

    let own = app.get(&format!("/api/v1/webs/{}", web.id), Some(USER)).await;
    assert_eq!(own.status(), StatusCode::OK);

    let foreign = app
        .get(&format!("/api/v1/webs/{}", web.id), Some(OTHER_USER))
        .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let analyze = app
        .post_json(
            &format!("/api/v1/webs/{}/analyze", web.id),
            Some(OTHER_USER),
            &json!({}),
        )
        .await;
    assert_eq!(analyze.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let app = build_test_app();
    let response = app
        .post_json("/api/v1/webs", None, &json!({"url": "https://example.com"}))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.len(), 0);
}

#[tokio::test]
async fn malformed_id_is_rejected() {
    let app = build_test_app();
    let response = app.get("/api/v1/webs/not-a-uuid", Some(USER)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
