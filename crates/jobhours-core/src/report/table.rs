use crate::stats::StatisticsSnapshot;

use super::html_escape;

/// Two-column Metric/Value table of the run statistics.
pub fn render_stats_table(stats: &StatisticsSnapshot) -> String {
    let rows: String = stats
        .display_rows()
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(label),
                html_escape(value)
            )
        })
        .collect();

    format!(
        "<table class=\"stats\">\n<thead><tr><th>Metric</th><th>Value</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>"
    )
}
