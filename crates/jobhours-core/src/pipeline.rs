//! One analysis run: load → fetch → clean → summarize → persist → render.

use std::path::PathBuf;

use crate::clean::clean;
use crate::error::{PipelineError, PipelineResult};
use crate::persist::{save_raw_data, PersistedFiles, DEFAULT_OUTPUT_DIR};
use crate::query::{load_query, DEFAULT_QUERY_FILE};
use crate::report::{write_report, DEFAULT_REPORT_FILE};
use crate::reporter::{RunEvent, RunReporter};
use crate::source::JobSource;
use crate::stats::StatisticsSnapshot;

/// File locations for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub query_file: PathBuf,
    pub output_dir: PathBuf,
    pub report_file: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            query_file: PathBuf::from(DEFAULT_QUERY_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub removed: usize,
    pub stats: StatisticsSnapshot,
    pub files: PersistedFiles,
    pub report_file: PathBuf,
}

/// Run every stage in order. The first failure is reported and returned;
/// later stages do not run.
pub async fn run(
    source: &dyn JobSource,
    settings: &RunSettings,
    reporter: &dyn RunReporter,
) -> PipelineResult<RunSummary> {
    let result = run_stages(source, settings, reporter).await;
    if let Err(error) = &result {
        reporter.report(RunEvent::StageFailed {
            stage: error.stage(),
            error,
        });
    }
    result
}

async fn run_stages(
    source: &dyn JobSource,
    settings: &RunSettings,
    reporter: &dyn RunReporter,
) -> PipelineResult<RunSummary> {
    let query = load_query(&settings.query_file)?;
    reporter.report(RunEvent::QueryLoaded {
        path: &settings.query_file,
        bytes: query.len(),
    });

    let raw = source
        .fetch_jobs(&query)
        .await
        .map_err(PipelineError::query)?;
    let fetched = raw.len();
    reporter.report(RunEvent::RecordsFetched {
        source: source.source_name(),
        count: fetched,
    });

    reporter.report(RunEvent::CleaningStarted { count: fetched });
    let cleaned = clean(raw)?;
    reporter.report(RunEvent::RecordsFiltered {
        over_limit: cleaned.removed_over_limit,
        missing_hours: cleaned.removed_missing_hours,
    });
    let counts = cleaned.standard_counts();
    reporter.report(RunEvent::StandardCounts { counts: &counts });

    let table = cleaned.table;
    let stats = StatisticsSnapshot::calculate(&table)?;
    reporter.report(RunEvent::StatisticsComputed { stats: &stats });

    let files = save_raw_data(&table, &stats, &settings.output_dir, reporter)?;
    write_report(&table, &stats, &settings.report_file, reporter)?;

    Ok(RunSummary {
        fetched,
        removed: cleaned.removed_over_limit + cleaned.removed_missing_hours,
        stats,
        files,
        report_file: settings.report_file.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, Stage};
    use crate::model::RawJobRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    struct FixedSource(Vec<RawJobRecord>);

    #[async_trait]
    impl JobSource for FixedSource {
        async fn fetch_jobs(&self, query: &str) -> Result<Vec<RawJobRecord>, SourceError> {
            assert!(query.starts_with("SELECT"));
            Ok(self.0.clone())
        }

        fn source_name(&self) -> &'static str {
            "fixture"
        }
    }

    struct FailingSource;

    #[async_trait]
    impl JobSource for FailingSource {
        async fn fetch_jobs(&self, _query: &str) -> Result<Vec<RawJobRecord>, SourceError> {
            Err("invalid query: Syntax error at [1:8]".into())
        }

        fn source_name(&self) -> &'static str {
            "failing"
        }
    }

    /// Test reporter that keeps a one-line summary of every event.
    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl RunReporter for Recorder {
        fn report(&self, event: RunEvent<'_>) {
            let line = match event {
                RunEvent::QueryLoaded { .. } => "query".to_string(),
                RunEvent::RecordsFetched { source, count } => format!("fetched {source} {count}"),
                RunEvent::CleaningStarted { count } => format!("initial {count}"),
                RunEvent::RecordsFiltered {
                    over_limit,
                    missing_hours,
                } => format!("filtered {over_limit} {missing_hours}"),
                RunEvent::StandardCounts { counts } => format!("standards {counts:?}"),
                RunEvent::StatisticsComputed { stats } => format!("stats {}", stats.total_jobs),
                RunEvent::FileWritten { kind, .. } => format!("wrote {kind:?}"),
                RunEvent::StageFailed { stage, .. } => format!("failed {stage}"),
            };
            self.0.lock().unwrap().push(line);
        }
    }

    fn raw(job: &str, hours: f64) -> RawJobRecord {
        RawJobRecord {
            job_num: job.to_string(),
            start_date: format!("2024-01-0{job}"),
            labor_hours_per_unit: Some(hours),
            prod_standard: Some(7.5),
        }
    }

    fn workspace() -> (TempDir, RunSettings) {
        let dir = tempdir().expect("temp dir");
        let query_file = dir.path().join("query.txt");
        std::fs::write(&query_file, "SELECT * FROM jobs").expect("write query");
        let settings = RunSettings {
            query_file,
            output_dir: dir.path().join("output"),
            report_file: dir.path().join(DEFAULT_REPORT_FILE),
        };
        (dir, settings)
    }

    #[tokio::test]
    async fn full_run_writes_every_output() {
        let (_dir, settings) = workspace();
        let source = FixedSource(vec![raw("3", 8.0), raw("2", 60.0), raw("1", 5.0)]);
        let recorder = Recorder::default();

        let summary = run(&source, &settings, &recorder).await.expect("run");

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.stats.total_jobs, 2);
        assert_eq!(summary.stats.percentage_over_standard, 50.0);
        assert!(summary.files.data.exists());
        assert!(summary.files.stats.exists());
        assert!(settings.report_file.exists());

        let events = recorder.0.into_inner().unwrap();
        assert_eq!(
            events,
            vec![
                "query",
                "fetched fixture 3",
                "initial 3",
                "filtered 1 0",
                "standards [(7.5, 2)]",
                "stats 2",
                "wrote RawData",
                "wrote Statistics",
                "wrote Report",
            ]
        );
    }

    #[tokio::test]
    async fn missing_query_file_stops_before_fetch() {
        let (_dir, mut settings) = workspace();
        settings.query_file = settings.query_file.with_file_name("nope.txt");
        let recorder = Recorder::default();

        let err = run(&FailingSource, &settings, &recorder)
            .await
            .expect_err("read must fail");

        assert_eq!(err.stage(), Stage::LoadQuery);
        assert_eq!(recorder.0.into_inner().unwrap(), vec!["failed load_query"]);
    }

    #[tokio::test]
    async fn query_failure_is_reported_and_nothing_is_written() {
        let (_dir, settings) = workspace();
        let recorder = Recorder::default();

        let err = run(&FailingSource, &settings, &recorder)
            .await
            .expect_err("query must fail");

        assert_eq!(err.stage(), Stage::Fetch);
        assert!(err.to_string().contains("Syntax error"));
        assert!(!settings.output_dir.exists());
        assert!(!settings.report_file.exists());
        assert_eq!(
            recorder.0.into_inner().unwrap(),
            vec!["query", "failed fetch"]
        );
    }

    #[tokio::test]
    async fn everything_filtered_is_data_error() {
        let (_dir, settings) = workspace();
        let source = FixedSource(vec![raw("1", 51.0), raw("2", 99.0)]);
        let recorder = Recorder::default();

        let err = run(&source, &settings, &recorder)
            .await
            .expect_err("empty table");

        assert!(matches!(err, PipelineError::Data(_)));
        assert!(!settings.output_dir.exists());
        let events = recorder.0.into_inner().unwrap();
        assert_eq!(events.last().map(String::as_str), Some("failed statistics"));
    }

    #[test]
    fn default_settings_use_fixed_paths() {
        let settings = RunSettings::default();
        assert_eq!(settings.query_file, PathBuf::from("query.txt"));
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.report_file, PathBuf::from("job_hours_analysis.html"));
    }
}
