//! Web models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use webs_core::analysis::{AnalysisResult, QuickMetadata};
use webs_core::types::{DbId, Timestamp, UserId};

use crate::models::entity::NewEntity;
use crate::models::status::{serialize_web_status, StatusId, WebStatus};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `webs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Web {
    pub id: DbId,
    pub user_id: UserId,
    pub space_id: Option<DbId>,
    pub urls: Vec<String>,
    pub prompt: Option<String>,
    #[serde(rename = "status", serialize_with = "serialize_web_status")]
    pub status_id: StatusId,
    pub run_id: Option<String>,

    pub quick_title: Option<String>,
    pub quick_emoji: Option<String>,
    pub quick_description: Option<String>,
    pub suggested_topics: Vec<String>,

    pub title: Option<String>,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub sentiment: Option<String>,
    pub confidence: Option<f32>,
    pub insights: Vec<String>,
    pub related_urls: Vec<String>,
    pub analysis: Option<serde_json::Value>,
    pub error_message: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Web {
    /// Typed status. Unknown ids are treated as `PENDING`.
    pub fn status(&self) -> WebStatus {
        WebStatus::from_id(self.status_id).unwrap_or(WebStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Title for display and notifications: final, then quick, then first URL.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.quick_title.clone())
            .or_else(|| self.urls.first().cloned())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /webs`. Either `url` or `urls` (or both) must be given.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebRequest {
    pub url: Option<String>,
    pub urls: Option<Vec<String>>,
    pub prompt: Option<String>,
    pub space_id: Option<DbId>,
}

/// Validated input for inserting a new `PENDING` web.
#[derive(Debug, Clone)]
pub struct NewWeb {
    pub user_id: UserId,
    pub urls: Vec<String>,
    pub prompt: Option<String>,
    pub space_id: Option<DbId>,
}

/// Body of `PATCH /webs/{id}`. Only the emoji is user-editable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWebEmoji {
    pub emoji: String,
}

/// Query parameters for `GET /webs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebListParams {
    pub space_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Final fields written when a web reaches `COMPLETE`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompleteWeb {
    pub title: Option<String>,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub topics: Vec<String>,
    pub sentiment: Option<String>,
    pub confidence: Option<f32>,
    pub insights: Vec<String>,
    pub related_urls: Vec<String>,
    pub analysis: serde_json::Value,
    pub entities: Vec<NewEntity>,
}

impl CompleteWeb {
    /// Build the completion write from a parsed result.
    ///
    /// `quick_title` and `urls` feed the title fallback chain.
    pub fn from_analysis(
        result: &AnalysisResult,
        raw: serde_json::Value,
        quick_title: Option<&str>,
        urls: &[String],
    ) -> Self {
        Self {
            title: result.resolve_title(quick_title, urls),
            emoji: result.emoji.clone(),
            description: result.description.clone(),
            topics: result.topics.clone(),
            sentiment: result.sentiment_label(),
            confidence: result.confidence,
            insights: result.insights.clone(),
            related_urls: result.related_urls.clone(),
            analysis: raw,
            entities: result
                .entities
                .iter()
                .map(|e| NewEntity {
                    name: e.name.clone(),
                    entity_type: e.entity_type.clone(),
                })
                .collect(),
        }
    }
}

/// Quick metadata partial write, applied only while `PROCESSING`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickMetadataUpdate {
    pub quick_title: Option<String>,
    pub quick_emoji: Option<String>,
    pub quick_description: Option<String>,
    pub suggested_topics: Vec<String>,
}

impl From<&QuickMetadata> for QuickMetadataUpdate {
    fn from(qm: &QuickMetadata) -> Self {
        Self {
            quick_title: qm.quick_title.clone(),
            quick_emoji: qm.quick_emoji.clone(),
            quick_description: qm.quick_description.clone(),
            suggested_topics: qm.suggested_topics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use webs_core::analysis::WorkflowOutcome;

    fn sample_web() -> Web {
        let now = Utc::now();
        Web {
            id: webs_core::types::new_id(),
            user_id: "user_1".into(),
            space_id: None,
            urls: vec!["https://example.com".into()],
            prompt: None,
            status_id: WebStatus::Processing.id(),
            run_id: Some("run-1".into()),
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
        }
    }

    #[test]
    fn status_serializes_as_label() {
        let value = serde_json::to_value(sample_web()).unwrap();
        assert_eq!(value["status"], "PROCESSING");
        assert!(value.get("status_id").is_none());
    }

    #[test]
    fn display_title_falls_back_to_url() {
        let mut web = sample_web();
        assert_eq!(web.display_title(), "https://example.com");
        web.quick_title = Some("Quick".into());
        assert_eq!(web.display_title(), "Quick");
        web.title = Some("Final".into());
        assert_eq!(web.display_title(), "Final");
    }

    #[test]
    fn complete_web_from_analysis_maps_fields() {
        let raw = json!({
            "topics": ["web"],
            "sentiment": {"label": "positive"},
            "entities": [{"name": "IANA", "type": "organization"}]
        });
        let WorkflowOutcome::Success { result, raw } = WorkflowOutcome::from_value(&raw) else {
            panic!("expected success");
        };
        let urls = vec!["https://example.com".to_string()];
        let update = CompleteWeb::from_analysis(&result, raw, Some("Example Domain"), &urls);

        assert_eq!(update.title.as_deref(), Some("Example Domain"));
        assert_eq!(update.sentiment.as_deref(), Some("positive"));
        assert_eq!(update.entities.len(), 1);
        assert_eq!(update.entities[0].entity_type, "organization");
    }
}
