//! BigQuery REST v2 client and [`jobhours_core::JobSource`] implementation.
//!
//! A query is submitted with `jobs.query`, waited on with
//! `jobs.getQueryResults` until the job completes, and paged until every row
//! is read. Rows are mapped to [`jobhours_core::RawJobRecord`] by column name.
//!
//! # Configuration
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `JOBHOURS_BIGQUERY_URL` | REST API base URL (default: Google endpoint) |
//! | `GOOGLE_CLOUD_PROJECT` | Billing project for the query job |
//! | `BIGQUERY_LOCATION` | Dataset location |
//! | `GOOGLE_OAUTH_ACCESS_TOKEN` | Pre-issued access token |
//! | `GOOGLE_APPLICATION_CREDENTIALS` | Service account key file |
//! | `JOBHOURS_TIMEOUT_SECS` | Per-request timeout (default: 120) |
//!
//! # Example
//!
//! ```no_run
//! use jobhours_bigquery::{BigQueryConfig, BigQueryJobSource};
//!
//! let config = BigQueryConfig::from_env().with_project("plant-analytics");
//! let source = BigQueryJobSource::new(config);
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod source;
pub mod types;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::BigQueryClient;
pub use error::{BigQueryError, BigQueryResult};
pub use source::{decode_rows, BigQueryJobSource};
pub use types::{BigQueryConfig, QueryResult, DEFAULT_API_URL};
