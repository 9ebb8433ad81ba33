//! Labor-hours-per-job analysis.
//!
//! The pipeline loads a query, fetches job rows through a [`JobSource`],
//! cleans them into a [`JobTable`], computes a [`StatisticsSnapshot`], writes
//! timestamped CSV files and renders an HTML report. Stages report progress
//! through an injected [`RunReporter`].
//!
//! ```no_run
//! # async fn example(source: &dyn jobhours_core::JobSource) -> jobhours_core::PipelineResult<()> {
//! use jobhours_core::{run, RunSettings, TracingReporter};
//!
//! let summary = run(source, &RunSettings::default(), &TracingReporter).await?;
//! println!("{} jobs summarized", summary.stats.total_jobs);
//! # Ok(())
//! # }
//! ```

pub mod clean;
pub mod error;
pub mod format;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod reporter;
pub mod source;
pub mod stats;

pub use clean::{clean, clean_records, CleanReport};
pub use error::{DataError, PipelineError, PipelineResult, SourceError, Stage};
pub use model::{
    JobRecord, JobTable, RawJobRecord, MAX_LABOR_HOURS_PER_UNIT, TARGET_PROD_STANDARD,
};
pub use persist::{save_raw_data, PersistedFiles, DEFAULT_OUTPUT_DIR};
pub use pipeline::{run, RunSettings, RunSummary};
pub use query::{load_query, DEFAULT_QUERY_FILE};
pub use report::{render_report, write_report, DEFAULT_REPORT_FILE};
pub use reporter::{OutputKind, RunEvent, RunReporter, TracingReporter};
pub use source::JobSource;
pub use stats::{StatisticsSnapshot, STAT_NAMES};
