//! Date parsing, range filtering and ordering of fetched jobs.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{PipelineError, PipelineResult};
use crate::model::{JobRecord, JobTable, RawJobRecord, MAX_LABOR_HOURS_PER_UNIT};

/// Naive date-time layouts tried in order after the plain date form.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Outcome of cleaning: the table plus what was removed along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub table: JobTable,
    /// Records dropped for LaborHoursPerUnit above the limit.
    pub removed_over_limit: usize,
    /// Records dropped because LaborHoursPerUnit was NULL.
    pub removed_missing_hours: usize,
}

impl CleanReport {
    pub fn removed(&self) -> usize {
        self.removed_over_limit + self.removed_missing_hours
    }

    /// Records per production standard, most frequent first, ties by
    /// ascending standard. Records without a standard are not counted.
    pub fn standard_counts(&self) -> Vec<(f64, usize)> {
        let mut counts: HashMap<u64, usize> = HashMap::new();
        for record in self.table.iter() {
            if let Some(standard) = record.prod_standard {
                *counts.entry(standard.to_bits()).or_default() += 1;
            }
        }
        let mut counts: Vec<(f64, usize)> = counts
            .into_iter()
            .map(|(bits, count)| (f64::from_bits(bits), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.total_cmp(&b.0)));
        counts
    }
}

/// Parse a warehouse date value.
///
/// Offsets are normalised to UTC before the offset is dropped.
pub fn parse_start_date(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .map_err(|e| format!("unrecognised date format ({e})"))
}

fn parse_record(raw: RawJobRecord) -> PipelineResult<JobRecord> {
    let start_date = parse_start_date(&raw.start_date).map_err(|reason| PipelineError::Parse {
        job_num: raw.job_num.clone(),
        value: raw.start_date.clone(),
        reason,
    })?;
    Ok(JobRecord {
        job_num: raw.job_num,
        start_date,
        // NULL hours become NaN; clean_records drops them.
        labor_hours_per_unit: raw.labor_hours_per_unit.unwrap_or(f64::NAN),
        prod_standard: raw.prod_standard,
    })
}

/// Clean fetched rows: parse every start date, drop out-of-range records,
/// sort by start date.
///
/// Dates are parsed for every row before any filtering, so a malformed date
/// fails the run even when the row would have been dropped.
pub fn clean(raw: Vec<RawJobRecord>) -> PipelineResult<CleanReport> {
    let parsed = raw
        .into_iter()
        .map(parse_record)
        .collect::<PipelineResult<Vec<_>>>()?;
    Ok(clean_records(parsed))
}

/// Filter and sort already-typed records.
///
/// Applying this to a cleaned table's records returns the same table.
pub fn clean_records(records: Vec<JobRecord>) -> CleanReport {
    let before = records.len();
    let mut removed_missing_hours = 0;
    let mut kept: Vec<JobRecord> = Vec::with_capacity(before);
    for record in records {
        if record.labor_hours_per_unit.is_nan() {
            removed_missing_hours += 1;
        } else if record.labor_hours_per_unit <= MAX_LABOR_HOURS_PER_UNIT {
            kept.push(record);
        }
    }
    let removed_over_limit = before - kept.len() - removed_missing_hours;

    // Stable: equal start dates keep fetch order.
    kept.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    CleanReport {
        table: JobTable::from_sorted(kept),
        removed_over_limit,
        removed_missing_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use proptest::prelude::*;

    fn raw(job: &str, date: &str, hours: Option<f64>, std: Option<f64>) -> RawJobRecord {
        RawJobRecord {
            job_num: job.to_string(),
            start_date: date.to_string(),
            labor_hours_per_unit: hours,
            prod_standard: std,
        }
    }

    #[test]
    fn drops_jobs_over_fifty_hours() {
        let report = clean(vec![
            raw("1", "2024-01-01", Some(5.0), Some(7.5)),
            raw("2", "2024-01-02", Some(60.0), Some(7.5)),
            raw("3", "2024-01-03", Some(8.0), Some(7.5)),
        ])
        .expect("clean");

        let jobs: Vec<&str> = report.table.iter().map(|r| r.job_num.as_str()).collect();
        assert_eq!(jobs, vec!["1", "3"]);
        assert_eq!(report.removed_over_limit, 1);
        assert_eq!(report.removed(), 1);
    }

    #[test]
    fn keeps_exactly_fifty() {
        let report = clean(vec![raw("1", "2024-01-01", Some(50.0), Some(7.5))]).expect("clean");
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.removed(), 0);
    }

    #[test]
    fn null_hours_are_dropped_and_counted_separately() {
        let report = clean(vec![
            raw("1", "2024-01-01", None, Some(7.5)),
            raw("2", "2024-01-02", Some(4.0), Some(7.5)),
        ])
        .expect("clean");
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.removed_missing_hours, 1);
        assert_eq!(report.removed_over_limit, 0);
    }

    #[test]
    fn sorts_by_start_date_and_is_stable() {
        let report = clean(vec![
            raw("c", "2024-03-01", Some(1.0), None),
            raw("a", "2024-01-01T08:00:00", Some(1.0), None),
            raw("b1", "2024-02-01", Some(1.0), None),
            raw("b2", "2024-02-01 00:00:00", Some(1.0), None),
        ])
        .expect("clean");

        let jobs: Vec<&str> = report.table.iter().map(|r| r.job_num.as_str()).collect();
        assert_eq!(jobs, vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn malformed_date_is_parse_error() {
        let err = clean(vec![
            raw("1", "2024-01-01", Some(5.0), Some(7.5)),
            raw("77", "01/02/2024", Some(5.0), Some(7.5)),
        ])
        .expect_err("malformed date");

        assert_eq!(err.stage(), Stage::Clean);
        match err {
            PipelineError::Parse { job_num, value, .. } => {
                assert_eq!(job_num, "77");
                assert_eq!(value, "01/02/2024");
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn parses_supported_date_forms() {
        let midnight = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_start_date("2024-05-06").unwrap(), midnight);
        assert_eq!(parse_start_date(" 2024-05-06 ").unwrap(), midnight);
        assert_eq!(parse_start_date("2024-05-06 00:00:00").unwrap(), midnight);
        assert_eq!(parse_start_date("2024-05-06T00:00:00.000").unwrap(), midnight);
        assert_eq!(parse_start_date("2024-05-06T02:00:00+02:00").unwrap(), midnight);
        assert_eq!(parse_start_date("2024-05-06T00:00:00Z").unwrap(), midnight);
        assert!(parse_start_date("2024-13-01").is_err());
        assert!(parse_start_date("").is_err());
    }

    #[test]
    fn standard_counts_are_most_frequent_first() {
        let report = clean(vec![
            raw("1", "2024-01-01", Some(1.0), Some(11.0)),
            raw("2", "2024-01-02", Some(1.0), Some(7.5)),
            raw("3", "2024-01-03", Some(1.0), Some(7.5)),
            raw("4", "2024-01-04", Some(1.0), None),
            raw("5", "2024-01-05", Some(1.0), Some(3.0)),
        ])
        .expect("clean");

        assert_eq!(
            report.standard_counts(),
            vec![(7.5, 2), (3.0, 1), (11.0, 1)]
        );
    }

    fn job_record() -> impl Strategy<Value = JobRecord> {
        (0u32..10_000, 0i64..3_650, 0.0f64..120.0, prop::option::of(0.0f64..20.0)).prop_map(
            |(job, day, hours, std)| JobRecord {
                job_num: job.to_string(),
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::days(day),
                labor_hours_per_unit: hours,
                prod_standard: std,
            },
        )
    }

    proptest! {
        #[test]
        fn keeps_exactly_the_in_range_records(records in prop::collection::vec(job_record(), 0..64)) {
            let expected = records
                .iter()
                .filter(|r| r.labor_hours_per_unit <= MAX_LABOR_HOURS_PER_UNIT)
                .count();
            let report = clean_records(records.clone());

            prop_assert_eq!(report.table.len(), expected);
            prop_assert_eq!(report.removed_over_limit, records.len() - expected);
            prop_assert!(report.table.iter().all(|r| r.labor_hours_per_unit <= MAX_LABOR_HOURS_PER_UNIT));
            prop_assert!(report
                .table
                .records()
                .windows(2)
                .all(|w| w[0].start_date <= w[1].start_date));
        }

        #[test]
        fn cleaning_is_a_fixed_point(records in prop::collection::vec(job_record(), 0..64)) {
            let once = clean_records(records);
            let twice = clean_records(once.table.clone().into_records());

            prop_assert_eq!(&twice.table, &once.table);
            prop_assert_eq!(twice.removed(), 0);
        }
    }
}
