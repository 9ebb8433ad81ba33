//! Client configuration and BigQuery REST v2 wire types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// BigQuery client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Project the query job runs in (billing project).
    #[serde(default)]
    pub project: Option<String>,

    /// Dataset location, e.g. `US` or `europe-west1`.
    #[serde(default)]
    pub location: Option<String>,

    /// Pre-issued OAuth2 access token.
    #[serde(default)]
    pub token: Option<String>,

    /// Service account key file used when no token is given.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Server-side wait per request while the job runs.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u32,

    /// Page size for result rows. `None` lets the server decide.
    #[serde(default)]
    pub max_results: Option<u32>,
}

pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_poll_timeout_ms() -> u32 {
    10_000
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            project: None,
            location: None,
            token: None,
            credentials_file: None,
            timeout_secs: default_timeout(),
            poll_timeout_ms: default_poll_timeout_ms(),
            max_results: None,
        }
    }
}

impl BigQueryConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `JOBHOURS_BIGQUERY_URL` | REST API base URL |
    /// | `GOOGLE_CLOUD_PROJECT` | Billing project |
    /// | `BIGQUERY_LOCATION` | Dataset location |
    /// | `GOOGLE_OAUTH_ACCESS_TOKEN` | Pre-issued access token |
    /// | `GOOGLE_APPLICATION_CREDENTIALS` | Service account key file |
    /// | `JOBHOURS_TIMEOUT_SECS` | Per-request timeout |
    pub fn from_env() -> Self {
        Self {
            url: non_empty_var("JOBHOURS_BIGQUERY_URL").unwrap_or_else(default_api_url),
            project: non_empty_var("GOOGLE_CLOUD_PROJECT"),
            location: non_empty_var("BIGQUERY_LOCATION"),
            token: non_empty_var("GOOGLE_OAUTH_ACCESS_TOKEN"),
            credentials_file: non_empty_var("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            timeout_secs: non_empty_var("JOBHOURS_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            poll_timeout_ms: default_poll_timeout_ms(),
            max_results: None,
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the billing project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the service account key file.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the result page size.
    pub fn with_max_results(mut self, rows: u32) -> Self {
        self.max_results = Some(rows);
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Body of `jobs.query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
    pub use_legacy_sql: bool,
    pub timeout_ms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

/// Response of `jobs.query` and `jobs.getQueryResults`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_reference: Option<JobReference>,

    #[serde(default)]
    pub schema: Option<TableSchema>,

    #[serde(default)]
    pub rows: Vec<TableRow>,

    #[serde(default)]
    pub page_token: Option<String>,

    #[serde(default)]
    pub job_complete: bool,

    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
}

/// One result row; cells follow schema order.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

/// Cell value: a string, null, or a nested value for RECORD/REPEATED fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Completed result of one query: schema plus every row across pages.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub job_id: Option<String>,
    pub schema: TableSchema,
    pub rows: Vec<TableRow>,
}

impl QueryResult {
    /// Position of the named column in every row.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.fields.iter().position(|f| f.name == name)
    }

    /// Declared type of the named column.
    pub fn column_type(&self, name: &str) -> Option<&str> {
        self.schema
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type.as_str())
    }
}
