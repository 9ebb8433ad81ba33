//! HTTP layer: auth header, status mapping, JSON decoding.
//!
//! This is the only place that interprets status codes. client/mod.rs
//! works with decoded responses and typed errors.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::error::{BigQueryError, BigQueryResult};
use crate::types::ErrorResponse;

#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) token_provider: TokenProvider,
}

impl HttpBackend {
    pub(crate) async fn post_json<B, T>(&self, url: &str, body: &B) -> BigQueryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(url).json(body);
        self.send(request, url).await
    }

    pub(crate) async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> BigQueryResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(url).query(query);
        self.send(request, url).await
    }

    /// Single attempt; failures are returned as-is.
    async fn send<T>(&self, mut request: reqwest::RequestBuilder, url: &str) -> BigQueryResult<T>
    where
        T: DeserializeOwned,
    {
        if let Some(token) = self.token_provider.get_token().await? {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "bigquery response");

        if status.is_success() {
            return response.json().await.map_err(|e| {
                BigQueryError::invalid_response(format!("failed to parse response body: {}", e))
            });
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status.as_u16(), &body, retry_after))
    }
}

/// Map a non-success status and its body to an error.
pub(crate) fn map_status(status: u16, body: &str, retry_after: Option<Duration>) -> BigQueryError {
    let message = error_message(body);

    match status {
        400 => BigQueryError::InvalidQuery { message },
        401 => BigQueryError::Unauthorized {
            message: if message.is_empty() {
                "invalid or expired access token".to_string()
            } else {
                message
            },
        },
        403 => BigQueryError::Forbidden { message },
        404 => BigQueryError::NotFound { message },
        429 => BigQueryError::RateLimited { retry_after },
        _ => BigQueryError::Http { status, message },
    }
}

/// Engine message from a `{"error": {...}}` body, or the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => match envelope.error.status {
            Some(code) if !code.is_empty() => format!("{} ({})", envelope.error.message, code),
            _ => envelope.error.message,
        },
        _ => body.trim().to_string(),
    }
}
