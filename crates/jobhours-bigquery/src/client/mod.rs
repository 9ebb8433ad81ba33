//! BigQuery client for running a query to completion.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::{BigQueryError, BigQueryResult};
use crate::types::{BigQueryConfig, ErrorProto, QueryRequest, QueryResponse, QueryResult};

mod http;

use http::HttpBackend;

const USER_AGENT_VALUE: &str = concat!("jobhours/", env!("CARGO_PKG_VERSION"));

/// Client for the BigQuery REST v2 API.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    http: HttpBackend,
    base_url: Url,
    project: String,
    location: Option<String>,
    poll_timeout_ms: u32,
    max_results: Option<u32>,
}

impl BigQueryClient {
    pub fn new(config: BigQueryConfig) -> BigQueryResult<Self> {
        let token_provider = TokenProvider::from_config(&config)?;
        Self::with_token_provider(config, token_provider)
    }

    pub fn with_token_provider(
        config: BigQueryConfig,
        token_provider: TokenProvider,
    ) -> BigQueryResult<Self> {
        let project = config
            .project
            .clone()
            .or_else(|| token_provider.project_id().map(String::from))
            .ok_or_else(|| BigQueryError::Config {
                message: "no project configured; set GOOGLE_CLOUD_PROJECT or --project"
                    .to_string(),
            })?;

        let base_url = Url::parse(config.url.trim_end_matches('/')).map_err(|e| {
            BigQueryError::Config {
                message: format!("invalid API URL '{}': {}", config.url, e),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(BigQueryError::Config {
                message: format!("API URL '{}' cannot be a base URL", config.url),
            });
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| BigQueryError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                token_provider,
            },
            base_url,
            project,
            location: config.location,
            poll_timeout_ms: config.poll_timeout_ms,
            max_results: config.max_results,
        })
    }

    /// Billing project the jobs run in.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Run a standard-SQL query and wait for every result row.
    ///
    /// Waits on the same job while it is incomplete, then follows page
    /// tokens. Failed requests are not retried.
    pub async fn run_query(&self, query: &str) -> BigQueryResult<QueryResult> {
        let url = self.endpoint(&["queries"])?;
        debug!(url = %url, project = %self.project, "submitting query job");

        let request = QueryRequest {
            query,
            use_legacy_sql: false,
            timeout_ms: self.poll_timeout_ms,
            location: self.location.as_deref(),
            max_results: self.max_results,
        };
        let mut response: QueryResponse = self.http.post_json(url.as_str(), &request).await?;

        while !response.job_complete {
            let id = job_id(&response)?;
            debug!(job_id = %id, "query job still running");
            response = self.get_results(&response, None).await?;
        }

        let job_id = response.job_reference.as_ref().map(|r| r.job_id.clone());
        let schema = match response.schema.take() {
            Some(schema) => schema,
            None if !response.errors.is_empty() => {
                return Err(BigQueryError::JobFailed {
                    job_id: job_id.unwrap_or_default(),
                    message: join_errors(&response.errors),
                });
            }
            None => {
                return Err(BigQueryError::invalid_response(
                    "completed query returned no schema",
                ))
            }
        };

        let mut rows = std::mem::take(&mut response.rows);
        while let Some(token) = response.page_token.take() {
            debug!(rows = rows.len(), "fetching next result page");
            response = self.get_results(&response, Some(token)).await?;
            rows.append(&mut response.rows);
        }

        debug!(job_id = ?job_id, rows = rows.len(), "query job complete");
        Ok(QueryResult {
            job_id,
            schema,
            rows,
        })
    }

    /// `jobs.getQueryResults` for the job behind `previous`.
    async fn get_results(
        &self,
        previous: &QueryResponse,
        page_token: Option<String>,
    ) -> BigQueryResult<QueryResponse> {
        let job_id = job_id(previous)?;
        let url = self.endpoint(&["queries", job_id])?;

        let mut params = vec![("timeoutMs", self.poll_timeout_ms.to_string())];
        let location = previous
            .job_reference
            .as_ref()
            .and_then(|r| r.location.clone())
            .or_else(|| self.location.clone());
        if let Some(location) = location {
            params.push(("location", location));
        }
        if let Some(max) = self.max_results {
            params.push(("maxResults", max.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        self.http.get_json(url.as_str(), &params).await
    }

    fn endpoint(&self, tail: &[&str]) -> BigQueryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BigQueryError::Config {
                message: format!("API URL '{}' cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["projects", self.project.as_str()])
            .extend(tail);
        Ok(url)
    }
}

fn job_id(response: &QueryResponse) -> BigQueryResult<&str> {
    response
        .job_reference
        .as_ref()
        .map(|r| r.job_id.as_str())
        .ok_or_else(|| BigQueryError::invalid_response("response is missing jobReference"))
}

fn join_errors(errors: &[ErrorProto]) -> String {
    errors
        .iter()
        .map(|e| match &e.reason {
            Some(reason) => format!("{} ({})", e.message, reason),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
