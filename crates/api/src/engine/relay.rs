//! Per-connection task behind `GET /api/v1/webs/{id}/stream`.
//!
//! Watches the engine run for one web and forwards translated
//! [`RelayEvent`]s to the browser through a bounded channel:
//!
//! - opens with `connected`; a web that is already terminal gets its
//!   persisted terminal event and the stream closes without contacting
//!   the engine;
//! - quick metadata is persisted best-effort while `PROCESSING`;
//! - terminal events are written back through the reconciler, the same
//!   path the webhook uses;
//! - a `web.completed` / `web.failed` bus event for this web (the webhook
//!   won the race) surfaces the persisted state and closes;
//! - transport errors and idle timeouts reconnect under the configured
//!   [`ReconnectPolicy`](webs_core::reconnect::ReconnectPolicy), but only
//!   while the web is still non-terminal.
//!
//! Nothing is sent after the single terminal event. The task ends as soon
//! as the browser disconnects.

use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use webs_core::analysis::{WorkflowOutcome, GENERIC_FAILURE_MESSAGE};
use webs_core::notifications::{EVENT_WEB_COMPLETED, EVENT_WEB_FAILED, WORKFLOW_ANALYZE_WEB};
use webs_core::types::DbId;
use webs_db::models::status::WebStatus;
use webs_db::models::web::{QuickMetadataUpdate, Web};
use webs_events::PlatformEvent;
use webs_mastra::{MastraError, RelayEvent, StreamRelay};

use crate::engine::reconciler::{self, Reconciled, SAVE_FAILED_MESSAGE};
use crate::state::AppState;

/// Events buffered between the relay task and the HTTP response.
const CHANNEL_CAPACITY: usize = 64;

/// Start relaying for `web`. The returned receiver ends when the relay
/// is done.
pub fn spawn(state: AppState, web: Web) -> mpsc::Receiver<RelayEvent> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run(state, web, tx));
    rx
}

/// Relay until a terminal event, a give-up, or client disconnect.
pub async fn run(state: AppState, web: Web, tx: mpsc::Sender<RelayEvent>) {
    let web_id = web.id;
    let bus = Some(state.event_bus.subscribe());
    let mut connection = RelayConnection {
        state,
        web_id,
        tx,
        relay: StreamRelay::new(),
        bus,
    };
    connection.serve(web).await;
    tracing::debug!(web_id = %web_id, "Stream relay closed");
}

/// The terminal event matching a web's persisted state, if it has one.
pub fn terminal_event(web: &Web) -> Option<RelayEvent> {
    match web.status() {
        WebStatus::Complete => Some(RelayEvent::WorkflowComplete {
            result: web
                .analysis
                .clone()
                .unwrap_or_else(|| serde_json::json!({ "title": web.display_title() })),
        }),
        WebStatus::Failed => Some(RelayEvent::WorkflowFailed {
            error: web
                .error_message
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        }),
        WebStatus::Pending | WebStatus::Processing => None,
    }
}

/// How one watch attempt ended.
enum WatchEnd {
    /// A terminal event was sent.
    Finished,
    /// The browser went away.
    ClientGone,
    /// The engine no longer knows the run.
    RunNotFound,
    /// The engine stream broke. `received` is true if any record arrived
    /// on this attempt.
    Interrupted {
        error: MastraError,
        received: bool,
    },
}

struct RelayConnection {
    state: AppState,
    web_id: DbId,
    tx: mpsc::Sender<RelayEvent>,
    relay: StreamRelay,
    bus: Option<broadcast::Receiver<PlatformEvent>>,
}

impl RelayConnection {
    async fn serve(&mut self, web: Web) {
        let run_id = match self.state.runs.get(web.id).await {
            Some(run_id) => Some(run_id),
            None => web.run_id.clone(),
        };

        let connected = RelayEvent::Connected {
            web_id: web.id.to_string(),
            run_id: run_id.clone(),
            status: web.status().as_str().to_string(),
        };
        if !self.send(connected).await {
            return;
        }

        if web.is_terminal() {
            self.surface_persisted(&web).await;
            return;
        }
        let Some(run_id) = run_id else {
            self.send_fatal("Analysis has not been started").await;
            return;
        };

        let policy = self.state.config.mastra.reconnect.clone();
        let mut attempt: u32 = 0;

        loop {
            let (error, received) = match self.watch(&run_id).await {
                WatchEnd::Finished | WatchEnd::ClientGone => return,
                WatchEnd::RunNotFound => {
                    tracing::info!(web_id = %self.web_id, run_id = %run_id, "Workflow run not found");
                    self.surface_current().await;
                    return;
                }
                WatchEnd::Interrupted { error, received } => (error, received),
            };

            tracing::warn!(
                web_id = %self.web_id,
                run_id = %run_id,
                error = %error,
                "Workflow stream interrupted",
            );

            if !error.is_transient() {
                self.send_fatal(&error.to_string()).await;
                return;
            }
            let recoverable = RelayEvent::Error {
                message: error.to_string(),
                recoverable: true,
            };
            if !self.send(recoverable).await {
                return;
            }

            match self.state.store.find_web(self.web_id).await {
                Ok(Some(web)) if web.is_terminal() => {
                    self.surface_persisted(&web).await;
                    return;
                }
                Ok(Some(_)) => {}
                Ok(None) => {
                    self.send_fatal("Web no longer exists").await;
                    return;
                }
                Err(e) => {
                    tracing::error!(web_id = %self.web_id, error = %e, "Failed to re-read web");
                    self.send_fatal("Unable to check analysis status").await;
                    return;
                }
            }

            if received {
                attempt = 0;
            }
            attempt += 1;
            if !policy.should_retry(attempt, true) {
                self.send_fatal(&format!(
                    "Lost connection to the analysis after {} reconnect attempts",
                    policy.max_attempts
                ))
                .await;
                return;
            }

            let delay = policy.delay_for_attempt(attempt);
            tracing::info!(
                web_id = %self.web_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to workflow stream",
            );
            tokio::select! {
                () = self.tx.closed() => return,
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn watch(&mut self, run_id: &str) -> WatchEnd {
        let idle = self.state.config.mastra.stream_idle_timeout;

        let mut stream = match self.state.workflows.watch(WORKFLOW_ANALYZE_WEB, run_id).await {
            Ok(stream) => stream,
            Err(MastraError::RunNotFound(_)) => return WatchEnd::RunNotFound,
            Err(error) => {
                return WatchEnd::Interrupted {
                    error,
                    received: false,
                }
            }
        };

        let mut received = false;
        loop {
            tokio::select! {
                () = self.tx.closed() => return WatchEnd::ClientGone,

                event = next_bus_event(&mut self.bus) => {
                    let Some(event) = event else { continue };
                    let terminal = event.event_type == EVENT_WEB_COMPLETED
                        || event.event_type == EVENT_WEB_FAILED;
                    if terminal && event.is_for_web(self.web_id) {
                        tracing::debug!(web_id = %self.web_id, "Web reconciled elsewhere");
                        self.surface_current().await;
                        return WatchEnd::Finished;
                    }
                }

                next = tokio::time::timeout(idle, stream.next()) => {
                    let message = match next {
                        Err(_) => {
                            return WatchEnd::Interrupted {
                                error: MastraError::Timeout(idle),
                                received,
                            }
                        }
                        Ok(None) => {
                            return WatchEnd::Interrupted {
                                error: MastraError::Stream(
                                    "stream ended before a terminal event".to_string(),
                                ),
                                received,
                            }
                        }
                        Ok(Some(Err(error))) => return WatchEnd::Interrupted { error, received },
                        Ok(Some(Ok(message))) => message,
                    };
                    received = true;

                    for event in self.relay.handle(message) {
                        let event = match event {
                            RelayEvent::QuickMetadata(ref quick) => {
                                self.persist_quick_metadata(QuickMetadataUpdate::from(quick)).await;
                                event
                            }
                            event if event.is_terminal() => self.reconcile_terminal(event).await,
                            event => event,
                        };
                        if !self.send(event).await {
                            return WatchEnd::ClientGone;
                        }
                    }
                    if self.relay.is_finished() {
                        return WatchEnd::Finished;
                    }
                }
            }
        }
    }

    /// Write a terminal engine event back and return the event to forward.
    async fn reconcile_terminal(&mut self, event: RelayEvent) -> RelayEvent {
        let outcome = match &event {
            RelayEvent::WorkflowComplete { result } => WorkflowOutcome::from_value(result),
            RelayEvent::WorkflowFailed { error } => WorkflowOutcome::Failure {
                error: error.clone(),
            },
            _ => return event,
        };

        match reconciler::reconcile(&self.state, self.web_id, outcome).await {
            Ok(Reconciled::Completed(_)) => event,
            Ok(Reconciled::Failed(web)) => RelayEvent::WorkflowFailed {
                error: web
                    .error_message
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            },
            Ok(Reconciled::Duplicate) => match self.state.store.find_web(self.web_id).await {
                Ok(Some(web)) => terminal_event(&web).unwrap_or(event),
                _ => event,
            },
            Err(_) => RelayEvent::WorkflowFailed {
                error: SAVE_FAILED_MESSAGE.to_string(),
            },
        }
    }

    async fn persist_quick_metadata(&self, update: QuickMetadataUpdate) {
        match self.state.store.save_quick_metadata(self.web_id, &update).await {
            Ok(true) => tracing::debug!(web_id = %self.web_id, "Quick metadata saved"),
            Ok(false) => {
                tracing::debug!(web_id = %self.web_id, "Quick metadata skipped: web is not PROCESSING")
            }
            Err(e) => {
                tracing::warn!(web_id = %self.web_id, error = %e, "Failed to save quick metadata")
            }
        }
    }

    /// Re-read the web and surface whatever is persisted.
    async fn surface_current(&mut self) {
        match self.state.store.find_web(self.web_id).await {
            Ok(Some(web)) if web.is_terminal() => self.surface_persisted(&web).await,
            Ok(Some(web)) => {
                self.send_fatal(&format!(
                    "Workflow run is no longer available; web is {}",
                    web.status()
                ))
                .await;
            }
            Ok(None) => self.send_fatal("Web no longer exists").await,
            Err(e) => {
                tracing::error!(web_id = %self.web_id, error = %e, "Failed to re-read web");
                self.send_fatal("Unable to check analysis status").await;
            }
        }
    }

    async fn surface_persisted(&mut self, web: &Web) {
        if let Some(event) = terminal_event(web).and_then(|e| self.relay.finish_with(e)) {
            self.send(event).await;
        }
    }

    async fn send_fatal(&self, message: &str) {
        self.send(RelayEvent::Error {
            message: message.to_string(),
            recoverable: false,
        })
        .await;
    }

    /// Returns `false` once the browser has disconnected.
    async fn send(&self, event: RelayEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}

/// Next event from the bus. Pends forever once the bus has closed.
async fn next_bus_event(
    bus: &mut Option<broadcast::Receiver<PlatformEvent>>,
) -> Option<PlatformEvent> {
    let Some(rx) = bus.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Stream relay lagged behind the event bus");
            }
            Err(RecvError::Closed) => {
                *bus = None;
                return None;
            }
        }
    }
}
