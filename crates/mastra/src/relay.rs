//! Translation of engine watch records into browser-facing events.
//!
//! [`StreamRelay`] is a pure state machine: feed it [`WorkflowMessage`]s,
//! get back the [`RelayEvent`]s to forward. It performs no I/O, so the
//! HTTP stream task owns persistence and reconnects.
//!
//! Guarantees:
//!
//! - at most one terminal event (`workflow-complete` / `workflow-failed`)
//!   is ever produced, and nothing is produced after it;
//! - quick metadata is emitted once, before any terminal event;
//! - `detailed-analysis` output is projected to a bounded per-URL subset;
//! - repeated `watch` snapshots do not repeat step or status events.

use std::collections::HashMap;

use serde_json::Value;
use webs_core::analysis::{project_detailed_analysis, QuickMetadata};
use webs_core::steps::{display_name, is_detailed_analysis_step, is_quick_metadata_step};

use crate::events::RelayEvent;
use crate::messages::{RunStatus, StepUpdate, WatchSnapshot, WorkflowMessage};

/// Per-connection relay state.
#[derive(Debug, Default)]
pub struct StreamRelay {
    finished: bool,
    quick_metadata_sent: bool,
    step_statuses: HashMap<String, RunStatus>,
    workflow_status: Option<RunStatus>,
}

impl StreamRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the quick-metadata event has been produced.
    pub fn quick_metadata_sent(&self) -> bool {
        self.quick_metadata_sent
    }

    /// Translate one engine record.
    pub fn handle(&mut self, message: WorkflowMessage) -> Vec<RelayEvent> {
        if self.finished {
            return Vec::new();
        }

        let mut out = Vec::new();
        match message {
            WorkflowMessage::StepStart { step_id } => {
                self.on_step(
                    StepUpdate {
                        step_id,
                        status: RunStatus::Running,
                        output: None,
                        error: None,
                    },
                    &mut out,
                );
            }
            WorkflowMessage::StepUpdate(update) => self.on_step(update, &mut out),
            WorkflowMessage::Watch(snapshot) => self.on_watch(snapshot, &mut out),
            WorkflowMessage::WorkflowComplete { result } => {
                out.push(RelayEvent::WorkflowComplete { result });
            }
            WorkflowMessage::WorkflowFailed { error } => {
                out.push(RelayEvent::WorkflowFailed { error });
            }
            WorkflowMessage::Error { message } => {
                out.push(RelayEvent::Error {
                    message,
                    recoverable: false,
                });
            }
            WorkflowMessage::Unknown { kind } => {
                tracing::debug!(kind = %kind, "Ignoring unknown workflow record");
            }
        }

        self.seal(out)
    }

    /// Produce a terminal event from outside the engine stream, e.g. when
    /// the webhook path reconciled the web first. Returns `None` if a
    /// terminal event was already produced.
    pub fn finish_with(&mut self, event: RelayEvent) -> Option<RelayEvent> {
        if self.finished || !event.is_terminal() {
            return None;
        }
        self.finished = true;
        Some(event)
    }

    /// Cut the batch after the first terminal event and latch.
    fn seal(&mut self, mut events: Vec<RelayEvent>) -> Vec<RelayEvent> {
        if let Some(pos) = events.iter().position(RelayEvent::is_terminal) {
            events.truncate(pos + 1);
            self.finished = true;
        }
        events
    }

    fn on_step(&mut self, update: StepUpdate, out: &mut Vec<RelayEvent>) {
        if self.step_statuses.get(&update.step_id) == Some(&update.status) {
            return;
        }
        self.step_statuses
            .insert(update.step_id.clone(), update.status.clone());

        if update.status.is_paused() {
            out.push(RelayEvent::WorkflowWaiting {
                step_id: Some(update.step_id),
            });
            return;
        }

        let succeeded = update.status == RunStatus::Success;
        let analyses = match (&update.output, succeeded) {
            (Some(output), true) if is_detailed_analysis_step(&update.step_id) => {
                Some(project_detailed_analysis(output))
            }
            _ => None,
        };

        out.push(RelayEvent::StepProgress {
            step_name: display_name(&update.step_id),
            step_id: update.step_id.clone(),
            status: update.status.as_str().to_string(),
            analyses,
            error: update.error.clone(),
        });

        if succeeded && !self.quick_metadata_sent && is_quick_metadata_step(&update.step_id) {
            if let Some(quick) = update.output.as_ref().and_then(QuickMetadata::from_step_output) {
                self.quick_metadata_sent = true;
                out.push(RelayEvent::QuickMetadata(quick));
            }
        }
    }

    fn on_watch(&mut self, snapshot: WatchSnapshot, out: &mut Vec<RelayEvent>) {
        if let Some(step) = snapshot.current_step {
            self.on_step(step, out);
        }

        let Some(status) = snapshot.workflow_status else {
            return;
        };
        match status {
            RunStatus::Success => out.push(RelayEvent::WorkflowComplete {
                result: snapshot
                    .result
                    .unwrap_or_else(|| Value::Object(Default::default())),
            }),
            RunStatus::Failed => out.push(RelayEvent::WorkflowFailed {
                error: snapshot
                    .error
                    .unwrap_or_else(|| "Workflow failed".to_string()),
            }),
            status if self.workflow_status.as_ref() == Some(&status) => {}
            status => {
                let event = if status.is_paused() {
                    RelayEvent::WorkflowWaiting { step_id: None }
                } else {
                    RelayEvent::WorkflowStatus {
                        status: status.as_str().to_string(),
                    }
                };
                self.workflow_status = Some(status);
                out.push(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webs_core::analysis::WorkflowOutcome;

    fn step(id: &str, status: &str, output: Option<serde_json::Value>) -> WorkflowMessage {
        WorkflowMessage::StepUpdate(StepUpdate {
            step_id: id.into(),
            status: RunStatus::parse(status),
            output,
            error: None,
        })
    }

    #[test]
    fn step_progress_uses_display_names() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::StepStart {
            step_id: "fetch-urls".into(),
        });
        assert_eq!(
            events,
            vec![RelayEvent::StepProgress {
                step_id: "fetch-urls".into(),
                step_name: "Fetching content".into(),
                status: "running".into(),
                analyses: None,
                error: None,
            }]
        );

        let events = relay.handle(step("score-sources", "running", None));
        assert!(matches!(
            &events[0],
            RelayEvent::StepProgress { step_name, .. } if step_name == "Score Sources"
        ));
    }

    #[test]
    fn quick_metadata_emitted_once_after_step_success() {
        let mut relay = StreamRelay::new();
        let output = json!({
            "quickTitle": "Example Domain",
            "quickEmoji": "🌐",
            "quickDescription": "An example",
            "suggestedTopics": ["web", "example"]
        });

        assert_eq!(
            relay
                .handle(step("generate-quick-metadata", "running", None))
                .len(),
            1
        );

        let events = relay.handle(step("generate-quick-metadata", "success", Some(output.clone())));
        assert_eq!(events.len(), 2);
        match &events[1] {
            RelayEvent::QuickMetadata(qm) => {
                assert_eq!(qm.quick_title.as_deref(), Some("Example Domain"));
                assert_eq!(qm.suggested_topics, vec!["web", "example"]);
            }
            other => panic!("Expected QuickMetadata, got {other:?}"),
        }
        assert!(relay.quick_metadata_sent());

        let again = relay.handle(step("metadata", "success", Some(output)));
        assert!(again
            .iter()
            .all(|e| !matches!(e, RelayEvent::QuickMetadata(_))));
    }

    #[test]
    fn detailed_analysis_is_projected() {
        let mut relay = StreamRelay::new();
        let output = json!([{
            "title": "A",
            "topics": ["1", "2", "3", "4", "5", "6"],
            "insights": ["a", "b", "c", "d"],
            "sentiment": "positive",
            "content": "huge"
        }]);
        let events = relay.handle(step("detailed-analysis", "success", Some(output)));
        match &events[0] {
            RelayEvent::StepProgress {
                analyses: Some(analyses),
                ..
            } => {
                assert_eq!(analyses[0].topics.len(), 5);
                assert_eq!(analyses[0].insights.len(), 3);
            }
            other => panic!("Expected projected StepProgress, got {other:?}"),
        }
    }

    #[test]
    fn nothing_after_terminal_event() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::WorkflowComplete {
            result: json!({"title": "T"}),
        });
        assert_eq!(events.len(), 1);
        assert!(relay.is_finished());

        assert!(relay
            .handle(WorkflowMessage::WorkflowFailed { error: "late".into() })
            .is_empty());
        assert!(relay.handle(step("fetch-urls", "running", None)).is_empty());
        assert!(relay
            .finish_with(RelayEvent::WorkflowFailed { error: "x".into() })
            .is_none());
    }

    #[test]
    fn watch_snapshots_are_deduplicated() {
        let mut relay = StreamRelay::new();
        let snapshot = |step_status: &str, wf_status: &str| {
            WorkflowMessage::Watch(WatchSnapshot {
                current_step: Some(StepUpdate {
                    step_id: "fetch-urls".into(),
                    status: RunStatus::parse(step_status),
                    output: None,
                    error: None,
                }),
                workflow_status: Some(RunStatus::parse(wf_status)),
                result: None,
                error: None,
            })
        };

        let first = relay.handle(snapshot("running", "running"));
        assert_eq!(first.len(), 2);
        assert!(matches!(first[1], RelayEvent::WorkflowStatus { .. }));

        assert!(relay.handle(snapshot("running", "running")).is_empty());

        let third = relay.handle(snapshot("success", "running"));
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn watch_success_and_failure_are_terminal() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::Watch(WatchSnapshot {
            current_step: None,
            workflow_status: Some(RunStatus::Success),
            result: Some(json!({"title": "Done"})),
            error: None,
        }));
        assert_eq!(
            events,
            vec![RelayEvent::WorkflowComplete {
                result: json!({"title": "Done"})
            }]
        );

        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::Watch(WatchSnapshot {
            current_step: None,
            workflow_status: Some(RunStatus::Failed),
            result: None,
            error: Some("fetch failed".into()),
        }));
        assert_eq!(
            events,
            vec![RelayEvent::WorkflowFailed {
                error: "fetch failed".into()
            }]
        );
    }

    #[test]
    fn watch_success_without_result_completes_with_empty_object() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::Watch(WatchSnapshot {
            current_step: None,
            workflow_status: Some(RunStatus::Success),
            result: None,
            error: None,
        }));
        assert_eq!(events, vec![RelayEvent::WorkflowComplete { result: json!({}) }]);
        assert!(matches!(
            WorkflowOutcome::from_value(&json!({})),
            WorkflowOutcome::Success { .. }
        ));
    }

    #[test]
    fn suspended_step_emits_waiting() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(step("approve", "suspended", None));
        assert_eq!(
            events,
            vec![RelayEvent::WorkflowWaiting {
                step_id: Some("approve".into())
            }]
        );
    }

    #[test]
    fn engine_error_is_not_terminal() {
        let mut relay = StreamRelay::new();
        let events = relay.handle(WorkflowMessage::Error {
            message: "hiccup".into(),
        });
        assert_eq!(events.len(), 1);
        assert!(!relay.is_finished());
    }

    #[test]
    fn finish_with_latches() {
        let mut relay = StreamRelay::new();
        assert!(relay
            .finish_with(RelayEvent::Error { message: "x".into(), recoverable: false })
            .is_none());
        assert!(relay
            .finish_with(RelayEvent::WorkflowFailed { error: "x".into() })
            .is_some());
        assert!(relay.is_finished());
    }
}
