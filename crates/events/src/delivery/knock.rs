//! Knock workflow triggers with exponential-backoff retry.
//!
//! [`KnockNotifier`] triggers `POST {api_url}/v1/workflows/{key}/trigger`
//! with a bearer API key. Transport errors, `429` and `5xx` responses are
//! retried after each delay in [`KnockConfig::retry_delays`]; any other
//! non-2xx status fails immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::notify::{NotificationRequest, NotifyError, Notifier};

/// Default Knock API base URL.
pub const DEFAULT_KNOCK_API_URL: &str = "https://api.knock.app";

/// Retry delays (exponential backoff: 1s, 2s, 4s).
const DEFAULT_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// HTTP request timeout for a single attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Knock connection settings.
#[derive(Debug, Clone)]
pub struct KnockConfig {
    pub api_key: String,
    pub api_url: String,
    pub retry_delays: Vec<Duration>,
}

impl KnockConfig {
    /// Load from `KNOCK_API_KEY` / `KNOCK_API_URL`.
    ///
    /// Returns `None` when `KNOCK_API_KEY` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("KNOCK_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let api_url = std::env::var("KNOCK_API_URL")
            .unwrap_or_else(|_| DEFAULT_KNOCK_API_URL.to_string());
        Some(Self::new(api_key, api_url))
    }

    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
        }
    }
}

/// Sends notifications through Knock.
pub struct KnockNotifier {
    client: reqwest::Client,
    config: KnockConfig,
}

impl KnockNotifier {
    pub fn new(config: KnockConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn trigger_url(&self, workflow_key: &str) -> String {
        format!("{}/v1/workflows/{workflow_key}/trigger", self.config.api_url)
    }

    /// Execute a single trigger request and check the response status.
    async fn try_send(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotifyError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Whether a failed attempt is worth repeating.
fn is_retryable(err: &NotifyError) -> bool {
    match err {
        NotifyError::Request(_) => true,
        NotifyError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
    }
}

#[async_trait]
impl Notifier for KnockNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        let url = self.trigger_url(request.workflow_key);
        let payload = json!({
            "recipients": [request.recipient],
            "data": request.data,
        });

        let mut delays = self.config.retry_delays.iter();
        let mut attempt = 1u32;
        loop {
            match self.try_send(&url, &payload).await {
                Ok(()) => {
                    tracing::debug!(
                        workflow_key = request.workflow_key,
                        web_id = %request.data.web_id,
                        attempt,
                        "Knock workflow triggered",
                    );
                    return Ok(());
                }
                Err(e) if is_retryable(&e) => match delays.next() {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            workflow_key = request.workflow_key,
                            error = %e,
                            "Knock trigger failed, retrying",
                        );
                        tokio::time::sleep(*delay).await;
                        attempt += 1;
                    }
                    None => {
                        tracing::error!(
                            workflow_key = request.workflow_key,
                            error = %e,
                            "Knock trigger failed after all retries",
                        );
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}
