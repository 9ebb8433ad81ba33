//! Self-contained HTML report: a bar chart of the target-standard jobs above
//! a table of the run statistics.

pub mod chart;
pub mod table;

use std::path::Path;

use crate::error::{PipelineError, PipelineResult, Stage};
use crate::format::float_repr;
use crate::model::{JobTable, TARGET_PROD_STANDARD};
use crate::reporter::{OutputKind, RunEvent, RunReporter};
use crate::stats::StatisticsSnapshot;

pub use chart::BarChart;

pub const DEFAULT_REPORT_FILE: &str = "job_hours_analysis.html";

pub const REPORT_TITLE: &str = "Labor Hours Per Unit vs Production Standard Analysis";

/// Render the full report document.
pub fn render_report(table: &JobTable, stats: &StatisticsSnapshot) -> String {
    let chart = BarChart::for_standard(table, TARGET_PROD_STANDARD, stats.average_labor_hours_per_unit);
    let chart_title = format!(
        "Jobs with Production Standard {}",
        trim_float(TARGET_PROD_STANDARD)
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1"/>
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<h1>{title}</h1>
<section class="panel">
<h2>{chart_title}</h2>
{chart}
</section>
<section class="panel">
<h2>Statistics</h2>
{table}
</section>
</body>
</html>
"#,
        title = html_escape(REPORT_TITLE),
        css = inline_css(),
        chart_title = html_escape(&chart_title),
        chart = chart.render(),
        table = table::render_stats_table(stats),
    )
}

/// Render the report and write it to `path`, replacing any existing file.
pub fn write_report(
    table: &JobTable,
    stats: &StatisticsSnapshot,
    path: &Path,
    reporter: &dyn RunReporter,
) -> PipelineResult<()> {
    let html = render_report(table, stats);
    std::fs::write(path, html).map_err(|e| PipelineError::write(Stage::Render, path, e))?;
    reporter.report(RunEvent::FileWritten {
        kind: OutputKind::Report,
        path,
    });
    Ok(())
}

fn inline_css() -> &'static str {
    "body{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#222;background:#fff;}\
h1{font-size:24px;margin:0 0 16px 0;}\
h2{font-size:16px;margin:24px 0 8px 8px;text-align:left;}\
.panel{max-width:1240px;}\
svg{background:#fff;}\
svg .bar:hover rect{fill:#1f4fd1;}\
.stats{border-collapse:collapse;width:100%;max-width:1200px;font-size:16px;}\
.stats th{background:paleturquoise;text-align:left;padding:12px;}\
.stats td{background:lavender;text-align:left;padding:12px;height:26px;border-top:1px solid #fff;}"
}

/// `7.5` stays `7.5`, `11.0` becomes `11`.
pub(crate) fn trim_float(value: f64) -> String {
    let text = float_repr(value);
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
