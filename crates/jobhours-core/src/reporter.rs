//! Run reporting. Stages describe what happened through a [`RunReporter`]
//! handed to them by the caller instead of logging to a global.

use std::path::Path;

use tracing::{debug, error, info};

use crate::error::{PipelineError, Stage};
use crate::format::float_repr;
use crate::stats::StatisticsSnapshot;

/// Kind of file a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    RawData,
    Statistics,
    Report,
}

/// One observable step of a run.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    QueryLoaded { path: &'a Path, bytes: usize },
    RecordsFetched { source: &'a str, count: usize },
    CleaningStarted { count: usize },
    RecordsFiltered { over_limit: usize, missing_hours: usize },
    /// Records per production standard, most frequent first.
    StandardCounts { counts: &'a [(f64, usize)] },
    StatisticsComputed { stats: &'a StatisticsSnapshot },
    FileWritten { kind: OutputKind, path: &'a Path },
    StageFailed { stage: Stage, error: &'a PipelineError },
}

/// Sink for run events.
pub trait RunReporter: Send + Sync {
    fn report(&self, event: RunEvent<'_>);
}

impl<F> RunReporter for F
where
    F: Fn(RunEvent<'_>) + Send + Sync,
{
    fn report(&self, event: RunEvent<'_>) {
        self(event)
    }
}

/// Reporter that turns run events into `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn report(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::QueryLoaded { path, bytes } => {
                debug!(path = %path.display(), bytes, "query loaded");
            }
            RunEvent::RecordsFetched { source, count } => {
                info!("Retrieved {count} records from {source}");
            }
            RunEvent::CleaningStarted { count } => {
                info!("Initial data count: {count} records");
            }
            RunEvent::RecordsFiltered {
                over_limit,
                missing_hours,
            } => {
                if over_limit > 0 {
                    info!("Filtered out {over_limit} records with LaborHoursPerUnit > 50");
                }
                if missing_hours > 0 {
                    info!("Filtered out {missing_hours} records with no LaborHoursPerUnit");
                }
            }
            RunEvent::StandardCounts { counts } => {
                info!("Records by Production Standard:");
                for (standard, count) in counts {
                    info!("  Standard {}: {count} records", float_repr(*standard));
                }
            }
            RunEvent::StatisticsComputed { stats } => {
                debug!(
                    total_jobs = stats.total_jobs,
                    average = stats.average_labor_hours_per_unit,
                    over_standard = stats.jobs_over_standard,
                    "statistics computed"
                );
            }
            RunEvent::FileWritten { kind, path } => match kind {
                OutputKind::RawData => info!("Raw data saved to {}", path.display()),
                OutputKind::Statistics => info!("Statistics saved to {}", path.display()),
                OutputKind::Report => {
                    info!("Visualization has been saved as '{}'", path.display())
                }
            },
            RunEvent::StageFailed { stage, error } => {
                error!(stage = %stage, "{error}");
            }
        }
    }
}
