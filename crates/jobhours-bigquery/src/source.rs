//! [`JobSource`] backed by BigQuery.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use jobhours_core::model::{
    COL_JOB_NUM, COL_LABOR_HOURS_PER_UNIT, COL_PROD_STANDARD, COL_START_DATE,
};
use jobhours_core::{JobSource, RawJobRecord, SourceError};
use serde_json::Value;

use crate::client::BigQueryClient;
use crate::error::{BigQueryError, BigQueryResult};
use crate::types::{BigQueryConfig, QueryResult, TableRow};

/// Runs the analysis query on BigQuery and decodes job rows.
///
/// The client is built on each fetch, so a missing project or unreadable
/// key file fails the fetch stage rather than construction.
#[derive(Debug, Clone)]
pub struct BigQueryJobSource {
    config: BigQueryConfig,
}

impl BigQueryJobSource {
    pub fn new(config: BigQueryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl JobSource for BigQueryJobSource {
    async fn fetch_jobs(&self, query: &str) -> Result<Vec<RawJobRecord>, SourceError> {
        let client = BigQueryClient::new(self.config.clone())?;
        tracing::debug!(project = %client.project(), "BigQuery client ready");
        let result = client.run_query(query).await?;
        Ok(decode_rows(&result)?)
    }

    fn source_name(&self) -> &'static str {
        "BigQuery"
    }
}

/// Column positions and types resolved from the result schema.
struct Columns {
    job_num: usize,
    start_date: usize,
    start_date_is_timestamp: bool,
    labor_hours_per_unit: usize,
    prod_standard: usize,
}

impl Columns {
    fn resolve(result: &QueryResult) -> BigQueryResult<Self> {
        let index = |name: &str| {
            result.column_index(name).ok_or_else(|| {
                BigQueryError::invalid_response(format!("result has no '{}' column", name))
            })
        };
        Ok(Self {
            job_num: index(COL_JOB_NUM)?,
            start_date: index(COL_START_DATE)?,
            start_date_is_timestamp: result.column_type(COL_START_DATE) == Some("TIMESTAMP"),
            labor_hours_per_unit: index(COL_LABOR_HOURS_PER_UNIT)?,
            prod_standard: index(COL_PROD_STANDARD)?,
        })
    }
}

/// Map result rows to raw job records, locating columns by name.
pub fn decode_rows(result: &QueryResult) -> BigQueryResult<Vec<RawJobRecord>> {
    let columns = Columns::resolve(result)?;

    result
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| decode_row(row, i, &columns))
        .collect()
}

fn decode_row(row: &TableRow, index: usize, columns: &Columns) -> BigQueryResult<RawJobRecord> {
    let cell = |column: usize, name: &str| {
        row.f.get(column).map(|c| &c.v).ok_or_else(|| {
            BigQueryError::invalid_response(format!("row {} has no '{}' cell", index, name))
        })
    };

    let job_num = text(cell(columns.job_num, COL_JOB_NUM)?).unwrap_or_default();

    let start_value = cell(columns.start_date, COL_START_DATE)?;
    let start_date = match text(start_value) {
        Some(raw) if columns.start_date_is_timestamp => timestamp_to_rfc3339(&raw)
            .ok_or_else(|| {
                BigQueryError::invalid_response(format!(
                    "row {}: '{}' is not a TIMESTAMP value",
                    index, raw
                ))
            })?,
        Some(raw) => raw,
        None => String::new(),
    };

    Ok(RawJobRecord {
        job_num,
        start_date,
        labor_hours_per_unit: number(
            cell(columns.labor_hours_per_unit, COL_LABOR_HOURS_PER_UNIT)?,
            index,
            COL_LABOR_HOURS_PER_UNIT,
        )?,
        prod_standard: number(
            cell(columns.prod_standard, COL_PROD_STANDARD)?,
            index,
            COL_PROD_STANDARD,
        )?,
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number(value: &Value, index: usize, name: &str) -> BigQueryResult<Option<f64>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| {
        BigQueryError::invalid_response(format!(
            "row {}: {} value {} is not a number",
            index, name, value
        ))
    })
}

/// TIMESTAMP cells are epoch seconds in float notation, e.g. `1.7040672E9`.
fn timestamp_to_rfc3339(raw: &str) -> Option<String> {
    let seconds: f64 = raw.trim().parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round() as i64;
    let at = DateTime::from_timestamp_micros(micros)?;
    Some(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
