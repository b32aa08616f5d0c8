/// Errors from the workflow engine client.
#[derive(Debug, thiserror::Error)]
pub enum MastraError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine returned a non-2xx status code.
    #[error("Mastra API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The engine does not know this run (404 on watch).
    #[error("Workflow run {0} not found")]
    RunNotFound(String),

    /// A response body could not be understood.
    #[error("Failed to parse engine response: {0}")]
    Parse(String),

    /// The watch stream broke mid-read.
    #[error("Watch stream error: {0}")]
    Stream(String),

    /// No response (or no record) within the configured window.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl MastraError {
    /// Whether a later re-watch might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) | Self::Stream(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::RunNotFound(_) | Self::Parse(_) => false,
        }
    }
}
