//! Shapes of the analysis data produced by the `analyzeWeb` workflow.
//!
//! The engine's JSON is loosely typed and has drifted across workflow
//! revisions, so every struct here deserializes leniently (missing, null
//! and mistyped fields take their defaults) and the helpers accept the
//! handful of envelopes seen in practice.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Topics kept per URL when forwarding `detailed-analysis` output.
pub const DETAIL_MAX_TOPICS: usize = 5;

/// Insights kept per URL when forwarding `detailed-analysis` output.
pub const DETAIL_MAX_INSIGHTS: usize = 3;

/// Fallback message when a failed run carries no usable error text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Workflow failed";

// ---------------------------------------------------------------------------
// Quick metadata
// ---------------------------------------------------------------------------

/// Early preview emitted by the quick-metadata step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickMetadata {
    pub quick_title: Option<String>,
    pub quick_emoji: Option<String>,
    pub quick_description: Option<String>,
    pub suggested_topics: Vec<String>,
}

impl QuickMetadata {
    /// Extract quick metadata from a step output.
    ///
    /// Returns `None` when the output is not an object or carries none of
    /// the four fields.
    pub fn from_step_output(output: &Value) -> Option<Self> {
        if !output.is_object() {
            return None;
        }
        let parsed: QuickMetadata = serde_json::from_value(output.clone()).ok()?;
        if parsed.is_empty() {
            None
        } else {
            Some(parsed)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quick_title.is_none()
            && self.quick_emoji.is_none()
            && self.quick_description.is_none()
            && self.suggested_topics.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Detailed analysis projection
// ---------------------------------------------------------------------------

/// Bounded per-URL subset forwarded to the browser after `detailed-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlAnalysisSummary {
    pub url: Option<String>,
    pub title: Option<String>,
    pub topics: Vec<String>,
    pub insights: Vec<String>,
    pub sentiment: Option<String>,
}

/// Project the `detailed-analysis` step output down to the fields the UI
/// renders: title, first five topics, first three insights, sentiment.
///
/// The output may be a bare array or an object wrapping one under
/// `analyses`, `urls` or `results`. Anything else projects to empty.
pub fn project_detailed_analysis(output: &Value) -> Vec<UrlAnalysisSummary> {
    let items = match output {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["analyses", "urls", "results"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| UrlAnalysisSummary {
            url: string_field(item, "url"),
            title: string_field(item, "title"),
            topics: string_list(item.get("topics"), DETAIL_MAX_TOPICS),
            insights: string_list(item.get("insights"), DETAIL_MAX_INSIGHTS),
            sentiment: item.get("sentiment").and_then(sentiment_label),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Final result
// ---------------------------------------------------------------------------

/// An entity (topic, person, organisation) extracted by final assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

const DEFAULT_ENTITY_TYPE: &str = "topic";

impl ExtractedEntity {
    /// Accepts `"name"` or `{"name": ..., "type": ...}`. Entries without a
    /// usable name are dropped; a missing or null type defaults to `topic`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let (name, entity_type) = match value {
            Value::String(name) => (non_blank(Some(name.as_str()))?, None),
            Value::Object(_) => (string_field(value, "name")?, string_field(value, "type")),
            _ => return None,
        };
        Some(Self {
            name,
            entity_type: entity_type.unwrap_or_else(|| DEFAULT_ENTITY_TYPE.to_string()),
        })
    }
}

/// Full analysis result of a successful run.
///
/// Every field falls back to its default when it is missing, `null`, or of
/// the wrong type, so a successful run never fails on result shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub emoji: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub topics: Vec<String>,
    /// Either a bare label or an object such as `{"label": "positive", "score": 0.8}`.
    pub sentiment: Option<Value>,
    /// A number, or a numeric string such as `"0.9"`.
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: Option<f32>,
    #[serde(deserialize_with = "lenient::strings")]
    pub insights: Vec<String>,
    #[serde(deserialize_with = "lenient::strings")]
    pub related_urls: Vec<String>,
    #[serde(deserialize_with = "lenient::entities")]
    pub entities: Vec<ExtractedEntity>,
}

/// Field deserializers that never fail: anything unusable becomes the
/// field's default.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::ExtractedEntity;

    pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(de)?;
        Ok(super::non_blank(value.as_str()))
    }

    pub fn strings<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(de)?;
        Ok(super::string_list(Some(&value), usize::MAX))
    }

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f32>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_f64().map(|n| n as f32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn entities<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<ExtractedEntity>, D::Error> {
        let value = Value::deserialize(de)?;
        Ok(value
            .as_array()
            .map(|items| items.iter().filter_map(ExtractedEntity::from_value).collect())
            .unwrap_or_default())
    }
}

impl AnalysisResult {
    /// Parse a result object. Anything that is not an object yields an
    /// empty result.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Sentiment reduced to its label.
    pub fn sentiment_label(&self) -> Option<String> {
        self.sentiment.as_ref().and_then(sentiment_label)
    }

    /// Title to persist: the result's own title, else the quick title,
    /// else the first source URL.
    pub fn resolve_title(&self, quick_title: Option<&str>, urls: &[String]) -> Option<String> {
        non_blank(self.title.as_deref())
            .or_else(|| non_blank(quick_title))
            .or_else(|| urls.first().cloned())
    }
}

/// Classified terminal payload of a workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// The run succeeded. `raw` is the unwrapped result object as received.
    Success { result: AnalysisResult, raw: Value },
    /// The run failed with a human-readable reason.
    Failure { error: String },
}

impl WorkflowOutcome {
    /// Classify a terminal payload.
    ///
    /// Accepts either the bare result object or the engine's run envelope
    /// `{"status": ..., "result": {...}, "error": ...}`. A payload counts as
    /// a failure only when `status == "failed"` or a non-null `error` is
    /// present; result shape never turns a success into a failure.
    pub fn from_value(value: &Value) -> Self {
        if let Some(error) = failure_reason(value) {
            return Self::Failure { error };
        }

        let inner = match value.get("result") {
            Some(inner) if inner.is_object() && value.get("status").is_some() => inner,
            _ => value,
        };
        if let Some(error) = failure_reason(inner) {
            return Self::Failure { error };
        }

        // A success with no result object still completes, with an empty result.
        let raw = if inner.is_object() {
            inner.clone()
        } else {
            Value::Object(Default::default())
        };
        Self::Success {
            result: AnalysisResult::from_value(&raw),
            raw,
        }
    }
}

fn failure_reason(value: &Value) -> Option<String> {
    let status_failed = value.get("status").and_then(Value::as_str) == Some("failed");
    let error = value.get("error").filter(|e| !e.is_null());

    if !status_failed && error.is_none() {
        return None;
    }

    let message = error
        .and_then(|e| {
            e.as_str()
                .map(str::to_string)
                .or_else(|| string_field(e, "message"))
        })
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
    Some(message)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reduce a sentiment value (string or `{label|overall}` object) to a label.
pub fn sentiment_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s)),
        Value::Object(_) => string_field(value, "label").or_else(|| string_field(value, "overall")),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    non_blank(value.get(key).and_then(Value::as_str))
}

fn string_list(value: Option<&Value>, max: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .take(max)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
