//! Names shared by the reconciler, the notifier and the event bus.

/// The only workflow this backend triggers and accepts callbacks for.
pub const WORKFLOW_ANALYZE_WEB: &str = "analyzeWeb";

/// Notification workflow fired when an analysis completes.
pub const NOTIFY_ANALYSIS_COMPLETE: &str = "web-analysis-complete";

/// Notification workflow fired when an analysis fails.
pub const NOTIFY_ANALYSIS_FAILED: &str = "web-analysis-failed";

/// Event-bus event published after a Web reaches `COMPLETE`.
pub const EVENT_WEB_COMPLETED: &str = "web.completed";

/// Event-bus event published after a Web reaches `FAILED`.
pub const EVENT_WEB_FAILED: &str = "web.failed";

/// Whether a webhook `workflowName` is one this backend handles.
pub fn is_known_workflow(name: &str) -> bool {
    name == WORKFLOW_ANALYZE_WEB
}
