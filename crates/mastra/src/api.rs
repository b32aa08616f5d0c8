//! REST client for the workflow engine's HTTP endpoints.
//!
//! Wraps the Mastra workflow API (run creation, start, watch) using
//! [`reqwest`]. The [`WorkflowClient`] trait is the seam the API server
//! depends on, so tests can substitute a scripted engine.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::Deserialize;

use crate::error::MastraError;
use crate::framing::RecordDecoder;
use crate::messages::{parse_message, WorkflowMessage};

/// Stream of parsed watch records. Unparseable records are logged and
/// skipped; an `Err` item means the transport failed and the stream ends.
pub type WorkflowStream = BoxStream<'static, Result<WorkflowMessage, MastraError>>;

/// Operations the server needs from the workflow engine.
#[async_trait]
pub trait WorkflowClient: Send + Sync {
    /// Create a run and return its id.
    async fn create_run(&self, workflow_id: &str) -> Result<String, MastraError>;

    /// Start a previously created run with the given input.
    async fn start_run(
        &self,
        workflow_id: &str,
        run_id: &str,
        input: &serde_json::Value,
    ) -> Result<(), MastraError>;

    /// Subscribe to a run's progress records.
    async fn watch(&self, workflow_id: &str, run_id: &str) -> Result<WorkflowStream, MastraError>;
}

/// Response of `POST /api/workflows/{id}/create-run`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRunResponse {
    run_id: String,
}

/// HTTP client for one workflow engine.
pub struct MastraApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl MastraApi {
    /// * `base_url` - e.g. `http://localhost:4111`.
    /// * `timeout` - bound on trigger calls and on opening the watch stream.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, timeout)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn workflow_url(&self, workflow_id: &str, action: &str) -> String {
        format!("{}/api/workflows/{workflow_id}/{action}", self.base_url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`MastraError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MastraError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MastraError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn map_request_error(&self, err: reqwest::Error) -> MastraError {
        if err.is_timeout() {
            MastraError::Timeout(self.timeout)
        } else {
            MastraError::Request(err)
        }
    }
}

#[async_trait]
impl WorkflowClient for MastraApi {
    async fn create_run(&self, workflow_id: &str) -> Result<String, MastraError> {
        let response = self
            .client
            .post(self.workflow_url(workflow_id, "create-run"))
            .timeout(self.timeout)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let body = Self::ensure_success(response)
            .await?
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;
        let parsed: CreateRunResponse =
            serde_json::from_str(&body).map_err(|e| MastraError::Parse(e.to_string()))?;
        Ok(parsed.run_id)
    }

    async fn start_run(
        &self,
        workflow_id: &str,
        run_id: &str,
        input: &serde_json::Value,
    ) -> Result<(), MastraError> {
        let response = self
            .client
            .post(self.workflow_url(workflow_id, "start"))
            .query(&[("runId", run_id)])
            .timeout(self.timeout)
            .json(&serde_json::json!({ "inputData": input }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn watch(&self, workflow_id: &str, run_id: &str) -> Result<WorkflowStream, MastraError> {
        let request = self
            .client
            .get(self.workflow_url(workflow_id, "watch"))
            .query(&[("runId", run_id)])
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| MastraError::Timeout(self.timeout))?
            .map_err(|e| self.map_request_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MastraError::RunNotFound(run_id.to_string()));
        }
        let response = Self::ensure_success(response).await?;

        Ok(record_stream(response.bytes_stream(), run_id.to_string()))
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct WatchState {
    bytes: ByteStream,
    decoder: RecordDecoder,
    pending: VecDeque<String>,
    done: bool,
    run_id: String,
}

/// Turn a response body into parsed records.
fn record_stream(
    bytes: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    run_id: String,
) -> WorkflowStream {
    let state = WatchState {
        bytes: Box::pin(bytes),
        decoder: RecordDecoder::new(),
        pending: VecDeque::new(),
        done: false,
        run_id,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.pending.pop_front() {
                match parse_message(&record) {
                    Ok(message) => return Some((Ok(message), state)),
                    Err(e) => {
                        tracing::warn!(
                            run_id = %state.run_id,
                            error = %e,
                            "Skipping unparseable workflow record",
                        );
                        continue;
                    }
                }
            }
            if state.done {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.push(&chunk) {
                    Ok(records) => state.pending.extend(records),
                    Err(e) => {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(MastraError::Stream(e.to_string())), state));
                }
                None => {
                    state.done = true;
                    if let Some(rest) = state.decoder.finish() {
                        state.pending.push_back(rest);
                    }
                }
            }
        }
    })
    .boxed()
}
