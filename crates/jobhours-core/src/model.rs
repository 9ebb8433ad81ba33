//! Job records as fetched and as cleaned.

use chrono::NaiveDateTime;

/// Jobs above this many labor hours per unit are treated as data errors and dropped.
pub const MAX_LABOR_HOURS_PER_UNIT: f64 = 50.0;

/// Production standard charted in the report.
pub const TARGET_PROD_STANDARD: f64 = 7.5;

/// Column names shared by the warehouse query and the data CSV.
pub const COL_JOB_NUM: &str = "JobNum";
pub const COL_START_DATE: &str = "StartDate";
pub const COL_LABOR_HOURS_PER_UNIT: &str = "LaborHoursPerUnit";
pub const COL_PROD_STANDARD: &str = "ProdStandard";

pub const JOB_COLUMNS: [&str; 4] = [
    COL_JOB_NUM,
    COL_START_DATE,
    COL_LABOR_HOURS_PER_UNIT,
    COL_PROD_STANDARD,
];

/// A row as returned by the warehouse, before date parsing and filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJobRecord {
    pub job_num: String,
    pub start_date: String,
    pub labor_hours_per_unit: Option<f64>,
    pub prod_standard: Option<f64>,
}

/// A cleaned job row.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job_num: String,
    pub start_date: NaiveDateTime,
    pub labor_hours_per_unit: f64,
    pub prod_standard: Option<f64>,
}

impl JobRecord {
    /// True when the job took longer per unit than its own standard.
    pub fn is_over_standard(&self) -> bool {
        self.prod_standard
            .is_some_and(|standard| self.labor_hours_per_unit > standard)
    }

    pub fn has_standard(&self, standard: f64) -> bool {
        self.prod_standard == Some(standard)
    }
}

/// Cleaned jobs, sorted ascending by start date, all within
/// [`MAX_LABOR_HOURS_PER_UNIT`].
///
/// Only [`crate::clean`] builds a table, so the invariants hold for every
/// instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobTable {
    records: Vec<JobRecord>,
}

impl JobTable {
    pub(crate) fn from_sorted(records: Vec<JobRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.records.iter()
    }

    /// Records charted for one production standard, in table order.
    pub fn with_standard(&self, standard: f64) -> impl Iterator<Item = &JobRecord> {
        self.records.iter().filter(move |r| r.has_standard(standard))
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a JobTable {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
