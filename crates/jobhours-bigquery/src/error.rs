//! Error types for the BigQuery client.

use std::time::Duration;

/// BigQuery client errors.
#[derive(Debug, thiserror::Error)]
pub enum BigQueryError {
    /// The engine rejected the statement (HTTP 400).
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Missing, invalid or expired credentials.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Credentials lack access to the project or dataset.
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Project, dataset or job not found.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Quota or rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Job finished without a result.
    #[error("query job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request did not complete within the configured timeout.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Transport failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Credentials could not be loaded or exchanged.
    #[error("authentication error: {message}")]
    Auth { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl BigQueryError {
    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Whether the failure came from credentials rather than the query.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::Forbidden { .. } | Self::Auth { .. }
        )
    }
}

impl From<reqwest::Error> for BigQueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for BigQuery operations.
pub type BigQueryResult<T> = Result<T, BigQueryError>;
