//! Access tokens for the BigQuery API.
//!
//! Supports two credential sources:
//! - a pre-issued OAuth2 access token (config or `GOOGLE_OAUTH_ACCESS_TOKEN`)
//! - a service account key file (`GOOGLE_APPLICATION_CREDENTIALS`), exchanged
//!   for an access token with the OAuth2 JWT-bearer grant

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{BigQueryError, BigQueryResult};
use crate::types::BigQueryConfig;

/// OAuth2 scope requested for service account tokens.
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Token provider for API authentication.
#[derive(Debug, Clone)]
pub enum TokenProvider {
    /// Pre-issued access token.
    Static(String),

    /// Service account key exchanged on demand; tokens are cached.
    ServiceAccount(ServiceAccountProvider),

    /// No authentication.
    None,
}

impl TokenProvider {
    /// Create a static token provider.
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Pick a provider from config: token first, then key file, then none.
    pub fn from_config(config: &BigQueryConfig) -> BigQueryResult<Self> {
        if let Some(token) = config.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(Self::Static(token.clone()));
        }
        if let Some(path) = &config.credentials_file {
            let key = ServiceAccountKey::from_file(path)?;
            return Ok(Self::ServiceAccount(ServiceAccountProvider::new(key)));
        }
        Ok(Self::None)
    }

    /// Get the current token, exchanging credentials if needed.
    pub async fn get_token(&self) -> BigQueryResult<Option<String>> {
        match self {
            Self::Static(token) => Ok(Some(token.clone())),
            Self::ServiceAccount(provider) => provider.get_token().await.map(Some),
            Self::None => Ok(None),
        }
    }

    /// Check if authentication is configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Project named in the service account key, if any.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Self::ServiceAccount(provider) => provider.key.project_id.as_deref(),
            _ => None,
        }
    }
}

/// Fields of a Google service account JSON key that the grant needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl ServiceAccountKey {
    /// Load a key file.
    pub fn from_file(path: &Path) -> BigQueryResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BigQueryError::auth(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&text)
    }

    /// Parse key JSON.
    pub fn from_json(text: &str) -> BigQueryResult<Self> {
        let key: Self = serde_json::from_str(text)
            .map_err(|e| BigQueryError::auth(format!("invalid service account key: {}", e)))?;
        match key.key_type.as_deref() {
            None | Some("service_account") => Ok(key),
            Some(other) => Err(BigQueryError::auth(format!(
                "unsupported credentials type '{}', expected service_account",
                other
            ))),
        }
    }

    /// Signed RS256 assertion for the JWT-bearer grant.
    pub fn assertion(&self, now: DateTime<Utc>) -> BigQueryResult<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: BIGQUERY_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| BigQueryError::auth(format!("invalid service account private key: {}", e)))?;
        encode(&header, &claims, &key)
            .map_err(|e| BigQueryError::auth(format!("failed to sign assertion: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    #[serde(default)]
    token_type: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges a service account key for access tokens.
#[derive(Debug, Clone)]
pub struct ServiceAccountProvider {
    key: Arc<ServiceAccountKey>,
    http: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountProvider {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key: Arc::new(key),
            http: reqwest::Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get token, exchanging a new assertion if the cached one is near expiry.
    pub async fn get_token(&self) -> BigQueryResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now() + Duration::seconds(60) {
                    tracing::debug!("using cached service account token");
                    return Ok(cached.token.clone());
                }
            }
        }

        tracing::debug!(client_email = %self.key.client_email, "exchanging service account assertion");
        self.exchange().await
    }

    async fn exchange(&self) -> BigQueryResult<String> {
        let assertion = self.key.assertion(Utc::now())?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| BigQueryError::auth(format!("failed to reach token endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BigQueryError::auth(format!(
                "token exchange failed: HTTP {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            BigQueryError::auth(format!("failed to parse token response: {}", e))
        })?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in as i64);
        *self.cached_token.write().await = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });

        tracing::debug!(
            expires_in = token.expires_in,
            token_type = token.token_type.as_deref().unwrap_or("Bearer"),
            "obtained access token"
        );

        Ok(token.access_token)
    }
}
