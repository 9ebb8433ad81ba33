//! Summary statistics over a cleaned job table.

use crate::error::DataError;
use crate::format::{fixed, float_repr};
use crate::model::JobTable;

/// Statistic names, in output order. Used as the stats CSV header.
pub const STAT_NAMES: [&str; 6] = [
    "Total Jobs",
    "Average Labor Hours Per Unit",
    "Max Labor Hours Per Unit",
    "Min Labor Hours Per Unit",
    "Jobs Over Standard",
    "Percentage Over Standard",
];

/// Metrics computed once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsSnapshot {
    pub total_jobs: usize,
    pub average_labor_hours_per_unit: f64,
    pub max_labor_hours_per_unit: f64,
    pub min_labor_hours_per_unit: f64,
    pub jobs_over_standard: usize,
    pub percentage_over_standard: f64,
}

impl StatisticsSnapshot {
    /// Compute statistics for `table`. An empty table has no mean, so it is
    /// rejected instead of producing NaN.
    pub fn calculate(table: &JobTable) -> Result<Self, DataError> {
        if table.is_empty() {
            return Err(DataError::EmptyTable);
        }

        let total_jobs = table.len();
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        let mut jobs_over_standard = 0;
        for record in table {
            let hours = record.labor_hours_per_unit;
            sum += hours;
            max = max.max(hours);
            min = min.min(hours);
            if record.is_over_standard() {
                jobs_over_standard += 1;
            }
        }

        Ok(Self {
            total_jobs,
            average_labor_hours_per_unit: sum / total_jobs as f64,
            max_labor_hours_per_unit: max,
            min_labor_hours_per_unit: min,
            jobs_over_standard,
            percentage_over_standard: jobs_over_standard as f64 / total_jobs as f64 * 100.0,
        })
    }

    /// Raw values in [`STAT_NAMES`] order, as written to the stats CSV.
    pub fn csv_values(&self) -> [String; 6] {
        [
            self.total_jobs.to_string(),
            float_repr(self.average_labor_hours_per_unit),
            float_repr(self.max_labor_hours_per_unit),
            float_repr(self.min_labor_hours_per_unit),
            self.jobs_over_standard.to_string(),
            float_repr(self.percentage_over_standard),
        ]
    }

    /// Labelled values as shown in the report table.
    pub fn display_rows(&self) -> [(&'static str, String); 6] {
        [
            ("Total Jobs", self.total_jobs.to_string()),
            (
                "Average Labor Hours/Unit",
                fixed(self.average_labor_hours_per_unit, 2),
            ),
            ("Max Labor Hours/Unit", fixed(self.max_labor_hours_per_unit, 2)),
            ("Min Labor Hours/Unit", fixed(self.min_labor_hours_per_unit, 2)),
            ("Jobs Over Standard", self.jobs_over_standard.to_string()),
            (
                "Percentage Over Standard",
                format!("{}%", fixed(self.percentage_over_standard, 1)),
            ),
        ]
    }
}
