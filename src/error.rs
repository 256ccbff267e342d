//! Error types for ocr-relay.

use std::time::Duration;

use thiserror::Error;

/// Main error type for ocr-relay operations.
#[derive(Error, Debug)]
pub enum OcrRelayError {
    /// Required configuration (API key, credentials) is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream login was rejected or the login response carried no token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The daily free recognition allowance is exhausted.
    #[error("daily recognition quota exhausted, try again tomorrow")]
    QuotaExceeded,

    /// Job submission was rejected or the response carried no job id.
    #[error("job submission failed: {0}")]
    Submission(String),

    /// The inbound request carried no usable image payload.
    #[error("invalid image payload: {0}")]
    Input(String),

    /// The recognition job did not end before the poll deadline.
    #[error("recognition job did not finish within {0:?}")]
    PollTimeout(Duration),

    /// Transport-level failure talking to upstream or fetching an image URL.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Upstream returned a body that does not parse as the expected shape.
    #[error("malformed upstream response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for ocr-relay operations.
pub type Result<T> = std::result::Result<T, OcrRelayError>;
