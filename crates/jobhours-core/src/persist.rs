//! Timestamped CSV output of the cleaned table and its statistics.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, NaiveTime};

use crate::error::{PipelineError, PipelineResult, Stage};
use crate::format::float_repr;
use crate::model::{JobTable, JOB_COLUMNS};
use crate::reporter::{OutputKind, RunEvent, RunReporter};
use crate::stats::{StatisticsSnapshot, STAT_NAMES};

pub const DEFAULT_OUTPUT_DIR: &str = "output";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Paths written by one persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedFiles {
    pub timestamp: String,
    pub data: PathBuf,
    pub stats: PathBuf,
}

/// File names for a run stamped at `now`.
pub fn output_paths(output_dir: &Path, now: NaiveDateTime) -> PersistedFiles {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    PersistedFiles {
        data: output_dir.join(format!("job_hours_data_{timestamp}.csv")),
        stats: output_dir.join(format!("job_hours_stats_{timestamp}.csv")),
        timestamp,
    }
}

/// Write the table and statistics under `output_dir`, stamped with the
/// current local time.
pub fn save_raw_data(
    table: &JobTable,
    stats: &StatisticsSnapshot,
    output_dir: &Path,
    reporter: &dyn RunReporter,
) -> PipelineResult<PersistedFiles> {
    save_raw_data_at(table, stats, output_dir, Local::now().naive_local(), reporter)
}

/// [`save_raw_data`] with an explicit timestamp.
pub fn save_raw_data_at(
    table: &JobTable,
    stats: &StatisticsSnapshot,
    output_dir: &Path,
    now: NaiveDateTime,
    reporter: &dyn RunReporter,
) -> PipelineResult<PersistedFiles> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| PipelineError::write(Stage::Persist, output_dir, e))?;

    let files = output_paths(output_dir, now);

    write_file(&files.data, &data_csv(table))?;
    reporter.report(RunEvent::FileWritten {
        kind: OutputKind::RawData,
        path: &files.data,
    });

    write_file(&files.stats, &stats_csv(stats))?;
    reporter.report(RunEvent::FileWritten {
        kind: OutputKind::Statistics,
        path: &files.stats,
    });

    Ok(files)
}

fn write_file(path: &Path, contents: &str) -> PipelineResult<()> {
    std::fs::write(path, contents).map_err(|e| PipelineError::write(Stage::Persist, path, e))
}

/// Row-level CSV of the cleaned table.
pub fn data_csv(table: &JobTable) -> String {
    let date_only = table
        .iter()
        .all(|r| r.start_date.time() == NaiveTime::MIN);
    let date_format = if date_only {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(table.len() + 1);
    rows.push(JOB_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in table {
        rows.push(vec![
            record.job_num.clone(),
            record.start_date.format(date_format).to_string(),
            float_repr(record.labor_hours_per_unit),
            record.prod_standard.map(float_repr).unwrap_or_default(),
        ]);
    }
    join_rows(rows)
}

/// Single-row CSV of the statistics.
pub fn stats_csv(stats: &StatisticsSnapshot) -> String {
    join_rows(vec![
        STAT_NAMES.iter().map(|c| c.to_string()).collect(),
        stats.csv_values().to_vec(),
    ])
}

fn join_rows(rows: Vec<Vec<String>>) -> String {
    let mut csv = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|field| escape_csv(field))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
