//! Workflow engine watch records and parser.
//!
//! Every record is a JSON object `{"type": "<kind>", "payload": {...}}`.
//! Engine releases disagree on the kind names and payload nesting, so the
//! parser reads the envelope loosely and normalizes it into
//! [`WorkflowMessage`]:
//!
//! | `type`                                   | message            |
//! |------------------------------------------|--------------------|
//! | `step-start`                             | `StepStart`        |
//! | `step-progress`, `step-result`, `step-finish` | `StepUpdate`  |
//! | `watch`                                  | `Watch`            |
//! | `workflow-complete`                      | `WorkflowComplete` |
//! | `workflow-failed`                        | `WorkflowFailed`   |
//! | `error`                                  | `Error`            |
//!
//! Anything else parses as `Unknown` so callers can log and continue.

use serde::Deserialize;
use serde_json::Value;

/// Status of a single step or of the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failed,
    Waiting,
    Suspended,
    Other(String),
}

impl RunStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "running" | "started" => Self::Running,
            "success" | "completed" => Self::Success,
            "failed" | "error" => Self::Failed,
            "waiting" => Self::Waiting,
            "suspended" => Self::Suspended,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Waiting => "waiting",
            Self::Suspended => "suspended",
            Self::Other(s) => s,
        }
    }

    /// `waiting` and `suspended` both mean the run is paused on input.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Waiting | Self::Suspended)
    }
}

/// Progress of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepUpdate {
    pub step_id: String,
    pub status: RunStatus,
    pub output: Option<Value>,
    pub error: Option<String>,
}

/// Snapshot carried by a `watch` record.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSnapshot {
    pub current_step: Option<StepUpdate>,
    pub workflow_status: Option<RunStatus>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

/// One normalized watch record.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowMessage {
    StepStart { step_id: String },
    StepUpdate(StepUpdate),
    Watch(WatchSnapshot),
    WorkflowComplete { result: Value },
    WorkflowFailed { error: String },
    Error { message: String },
    Unknown { kind: String },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Parse a single watch record.
///
/// Returns `Err` for malformed JSON, a missing `type`, or a recognized kind
/// whose payload lacks required fields (e.g. a step record with no id).
pub fn parse_message(text: &str) -> Result<WorkflowMessage, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let payload = envelope.payload;

    let message = match envelope.kind.as_str() {
        "step-start" => WorkflowMessage::StepStart {
            step_id: step_id(&payload).ok_or_else(missing_step_id)?,
        },
        "step-progress" | "step-result" | "step-finish" => {
            let default_status = if envelope.kind == "step-progress" {
                "running"
            } else {
                "success"
            };
            WorkflowMessage::StepUpdate(
                step_update(&payload, default_status).ok_or_else(missing_step_id)?,
            )
        }
        "watch" => WorkflowMessage::Watch(watch_snapshot(&payload)),
        "workflow-complete" => WorkflowMessage::WorkflowComplete {
            result: payload.get("result").cloned().unwrap_or(payload),
        },
        "workflow-failed" => WorkflowMessage::WorkflowFailed {
            error: error_text(payload.get("error").unwrap_or(&payload))
                .unwrap_or_else(|| "Workflow failed".to_string()),
        },
        "error" => WorkflowMessage::Error {
            message: error_text(payload.get("error").unwrap_or(&payload))
                .unwrap_or_else(|| "Unknown engine error".to_string()),
        },
        other => WorkflowMessage::Unknown {
            kind: other.to_string(),
        },
    };
    Ok(message)
}

fn missing_step_id() -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::missing_field("id")
}

fn step_id(payload: &Value) -> Option<String> {
    ["id", "stepId", "stepName"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn step_update(payload: &Value, default_status: &str) -> Option<StepUpdate> {
    Some(StepUpdate {
        step_id: step_id(payload)?,
        status: RunStatus::parse(
            payload
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or(default_status),
        ),
        output: payload.get("output").filter(|v| !v.is_null()).cloned(),
        error: payload.get("error").and_then(error_text),
    })
}

fn watch_snapshot(payload: &Value) -> WatchSnapshot {
    let state = payload.get("workflowState").unwrap_or(&Value::Null);
    WatchSnapshot {
        current_step: payload
            .get("currentStep")
            .and_then(|step| step_update(step, "running")),
        workflow_status: state
            .get("status")
            .and_then(Value::as_str)
            .map(RunStatus::parse),
        result: state.get("result").filter(|v| !v.is_null()).cloned(),
        error: state.get("error").and_then(error_text),
    }
}

/// Error text from a bare string or an object with `message`.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
