use thiserror::Error;

/// Errors that can occur when fetching upstream data
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (no response received)
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// A retryable status persisted through every retry
    #[error("HTTP {status} after {retries} retries")]
    RetriesExhausted { status: u16, retries: u32 },

    /// Final response carried a non-success status
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request body is a stream and cannot be replayed
    #[error("request body cannot be cloned; buffer the body to enable retries")]
    UnclonableRequest,
}

impl FetchError {
    /// Upstream HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RetriesExhausted { status, .. } | FetchError::Http { status, .. } => {
                Some(*status)
            }
            FetchError::Network(err) | FetchError::Body(err) => err.status().map(|s| s.as_u16()),
            FetchError::Decode(_) | FetchError::UnclonableRequest => None,
        }
    }
}
