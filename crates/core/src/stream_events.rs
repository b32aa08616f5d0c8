//! Discriminators of the events sent to the browser over `/webs/{id}/stream`.
//!
//! Every SSE frame carries a JSON object whose `type` field is one of
//! these values. The SSE `event:` name is set to the same string.

pub const MSG_TYPE_CONNECTED: &str = "connected";
pub const MSG_TYPE_STEP_PROGRESS: &str = "step-progress";
pub const MSG_TYPE_QUICK_METADATA: &str = "quick-metadata";
pub const MSG_TYPE_WORKFLOW_STATUS: &str = "workflow-status";
pub const MSG_TYPE_WORKFLOW_WAITING: &str = "workflow-waiting";
pub const MSG_TYPE_WORKFLOW_COMPLETE: &str = "workflow-complete";
pub const MSG_TYPE_WORKFLOW_FAILED: &str = "workflow-failed";
pub const MSG_TYPE_ERROR: &str = "error";

/// Event types after which the stream closes.
pub const TERMINAL_MSG_TYPES: &[&str] = &[MSG_TYPE_WORKFLOW_COMPLETE, MSG_TYPE_WORKFLOW_FAILED];

/// Whether `msg_type` ends the stream.
pub fn is_terminal(msg_type: &str) -> bool {
    TERMINAL_MSG_TYPES.contains(&msg_type)
}
