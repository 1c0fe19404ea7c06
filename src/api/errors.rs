use thiserror::Error;

/// Transport-level failures from the REST collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered and said no: a `success: false` envelope (even on
    /// HTTP 200) or a 4xx response.
    #[error("{0}")]
    Rejected(String),
    /// 5xx class responses.
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl ApiError {
    /// Only transient failures are worth retrying, and only for idempotent
    /// reads. A rejection will not change on replay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Server(_) | ApiError::Network(_))
    }
}
