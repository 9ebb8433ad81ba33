use jobhours_bigquery::BigQueryJobSource;
use jobhours_core::TracingReporter;
use tracing::debug;

use super::args::Cli;

/// Run every stage once against BigQuery.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let source = BigQueryJobSource::new(cli.bigquery_config());

    let summary = jobhours_core::run(&source, &cli.settings(), &TracingReporter).await?;
    debug!(
        fetched = summary.fetched,
        removed = summary.removed,
        jobs = summary.stats.total_jobs,
        over_standard = summary.stats.jobs_over_standard,
        "analysis complete"
    );
    Ok(())
}
