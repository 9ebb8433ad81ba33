use clap::Parser;
use std::path::PathBuf;

use jobhours_bigquery::{BigQueryConfig, DEFAULT_API_URL};
use jobhours_core::{RunSettings, DEFAULT_OUTPUT_DIR, DEFAULT_QUERY_FILE, DEFAULT_REPORT_FILE};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "jobhours",
    version,
    about = "Labor hours per unit vs production standard: fetch jobs from BigQuery, write CSV summaries and an HTML report"
)]
pub struct Cli {
    /// File holding the SQL statement to run
    #[arg(long, env = "JOBHOURS_QUERY_FILE", default_value = DEFAULT_QUERY_FILE)]
    pub query_file: PathBuf,

    /// Directory for the timestamped CSV files (created if missing)
    #[arg(long, env = "JOBHOURS_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// HTML report path (overwritten)
    #[arg(long, env = "JOBHOURS_REPORT", default_value = DEFAULT_REPORT_FILE)]
    pub report: PathBuf,

    /// Billing project for the query job (defaults to the service account's project)
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project: Option<String>,

    /// Dataset location, e.g. US or europe-west1
    #[arg(long, env = "BIGQUERY_LOCATION")]
    pub location: Option<String>,

    /// BigQuery REST API base URL
    #[arg(long, env = "JOBHOURS_BIGQUERY_URL", default_value = DEFAULT_API_URL)]
    pub bigquery_url: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "JOBHOURS_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Rows per result page (server default when unset)
    #[arg(long, env = "JOBHOURS_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Log debug detail (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            query_file: self.query_file.clone(),
            output_dir: self.output_dir.clone(),
            report_file: self.report.clone(),
        }
    }

    /// Credentials come from the environment; everything else from flags.
    pub fn bigquery_config(&self) -> BigQueryConfig {
        let mut config = BigQueryConfig::from_env()
            .with_url(self.bigquery_url.clone())
            .with_timeout_secs(self.timeout_secs);
        config.project = self.project.clone();
        config.location = self.location.clone();
        config.max_results = self.page_size;
        config
    }
}
