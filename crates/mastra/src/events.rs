//! Events sent to the browser over the SSE stream.

use serde::Serialize;
use serde_json::Value;
use webs_core::analysis::{QuickMetadata, UrlAnalysisSummary};
use webs_core::stream_events::{
    MSG_TYPE_CONNECTED, MSG_TYPE_ERROR, MSG_TYPE_QUICK_METADATA, MSG_TYPE_STEP_PROGRESS,
    MSG_TYPE_WORKFLOW_COMPLETE, MSG_TYPE_WORKFLOW_FAILED, MSG_TYPE_WORKFLOW_STATUS,
    MSG_TYPE_WORKFLOW_WAITING,
};

/// One browser-facing stream event, serialized as `{"type": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum RelayEvent {
    Connected {
        web_id: String,
        run_id: Option<String>,
        status: String,
    },
    StepProgress {
        step_id: String,
        step_name: String,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        analyses: Option<Vec<UrlAnalysisSummary>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Exactly the four quick-metadata fields.
    QuickMetadata(QuickMetadata),
    WorkflowStatus {
        status: String,
    },
    WorkflowWaiting {
        #[serde(skip_serializing_if = "Option::is_none")]
        step_id: Option<String>,
    },
    WorkflowComplete {
        result: Value,
    },
    WorkflowFailed {
        error: String,
    },
    Error {
        message: String,
        recoverable: bool,
    },
}

impl RelayEvent {
    /// The `type` discriminator, also used as the SSE `event:` name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Connected { .. } => MSG_TYPE_CONNECTED,
            Self::StepProgress { .. } => MSG_TYPE_STEP_PROGRESS,
            Self::QuickMetadata(_) => MSG_TYPE_QUICK_METADATA,
            Self::WorkflowStatus { .. } => MSG_TYPE_WORKFLOW_STATUS,
            Self::WorkflowWaiting { .. } => MSG_TYPE_WORKFLOW_WAITING,
            Self::WorkflowComplete { .. } => MSG_TYPE_WORKFLOW_COMPLETE,
            Self::WorkflowFailed { .. } => MSG_TYPE_WORKFLOW_FAILED,
            Self::Error { .. } => MSG_TYPE_ERROR,
        }
    }

    /// `workflow-complete` and `workflow-failed` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::WorkflowComplete { .. } | Self::WorkflowFailed { .. })
    }
}
