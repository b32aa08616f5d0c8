//! Log-only notifier used when no provider key is configured.

use async_trait::async_trait;

use crate::notify::{NotificationRequest, NotifyError, Notifier};

/// Writes each notification to the log instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        tracing::info!(
            workflow_key = request.workflow_key,
            recipient = %request.recipient,
            web_id = %request.data.web_id,
            status = %request.data.status,
            "Notification (log only, KNOCK_API_KEY not set)",
        );
        Ok(())
    }
}
