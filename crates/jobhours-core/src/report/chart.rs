//! Inline SVG bar chart with horizontal reference lines.

use std::fmt::Write as _;

use crate::format::fixed;
use crate::model::JobTable;

use super::{html_escape, trim_float};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 720.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 30.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 130.0;
/// Fraction of each category slot covered by its bar.
const BAR_FILL: f64 = 0.4;
const Y_TICKS: usize = 6;

const BAR_COLOR: &str = "#1f77b4";
const STANDARD_COLOR: &str = "red";
const AVERAGE_COLOR: &str = "green";

/// One bar: category label, value and the date shown above/on hover.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub date: String,
}

/// Horizontal reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub series_name: String,
    pub y_title: String,
    pub bars: Vec<Bar>,
    pub lines: Vec<ReferenceLine>,
}

impl BarChart {
    /// Chart of labor hours per unit for jobs at `standard`, with lines at
    /// the standard and at `average`.
    pub fn for_standard(table: &JobTable, standard: f64, average: f64) -> Self {
        let bars = table
            .with_standard(standard)
            .map(|r| Bar {
                label: r.job_num.clone(),
                value: r.labor_hours_per_unit,
                date: r.start_date.format("%Y-%m-%d").to_string(),
            })
            .collect();
        let standard_label = trim_float(standard);

        Self {
            series_name: format!("Labor Hours ({standard_label} Standard)"),
            y_title: "Hours Per Unit".to_string(),
            bars,
            lines: vec![
                ReferenceLine {
                    name: format!("Standard ({standard_label})"),
                    value: standard,
                    color: STANDARD_COLOR,
                    dashed: false,
                },
                ReferenceLine {
                    name: "Average Hours/Unit".to_string(),
                    value: average,
                    color: AVERAGE_COLOR,
                    dashed: true,
                },
            ],
        }
    }

    /// Upper bound of the value axis: the tallest bar or line plus headroom
    /// for the date labels, rounded up to a whole tick.
    pub fn y_max(&self) -> f64 {
        let top = self
            .bars
            .iter()
            .map(|b| b.value)
            .chain(self.lines.iter().map(|l| l.value))
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        let step = nice_step(top * 1.15 / Y_TICKS as f64);
        (top * 1.15 / step).ceil().max(1.0) * step
    }

    pub fn render(&self) -> String {
        let plot_w = WIDTH - LEFT - RIGHT;
        let plot_h = HEIGHT - TOP - BOTTOM;
        let y_max = self.y_max();
        let y_of = |v: f64| TOP + plot_h - (v / y_max * plot_h).clamp(0.0, plot_h);

        let mut out = String::with_capacity(4096 + self.bars.len() * 512);
        let _ = writeln!(
            out,
            "<svg class=\"chart\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" role=\"img\">"
        );
        let _ = writeln!(
            out,
            "<rect x=\"{LEFT}\" y=\"{TOP}\" width=\"{plot_w}\" height=\"{plot_h}\" fill=\"#fff\" stroke=\"#ddd\"/>"
        );

        self.render_y_axis(&mut out, plot_w, plot_h, y_max);

        if self.bars.is_empty() {
            let _ = writeln!(
                out,
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#777\">No jobs with this production standard</text>",
                LEFT + plot_w / 2.0,
                TOP + plot_h / 2.0
            );
        }

        let slot = plot_w / self.bars.len().max(1) as f64;
        let bar_w = slot * BAR_FILL;
        for (i, bar) in self.bars.iter().enumerate() {
            let center = LEFT + slot * (i as f64 + 0.5);
            let y = y_of(bar.value);
            let h = TOP + plot_h - y;
            let _ = writeln!(
                out,
                "<g class=\"bar\"><title>Job Number: {label}&#10;Date: {date}&#10;Value: {value}</title>\
<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{bar_w:.2}\" height=\"{h:.2}\" fill=\"{BAR_COLOR}\"/>\
<text x=\"{center:.2}\" y=\"{ty:.2}\" font-size=\"10\" transform=\"rotate(-90 {center:.2} {ty:.2})\">{date}</text></g>",
                label = html_escape(&bar.label),
                date = html_escape(&bar.date),
                value = fixed(bar.value, 2),
                x = center - bar_w / 2.0,
                ty = y - 4.0,
            );
            let ly = TOP + plot_h + 14.0;
            let _ = writeln!(
                out,
                "<text x=\"{center:.2}\" y=\"{ly:.2}\" font-size=\"12\" transform=\"rotate(45 {center:.2} {ly:.2})\">{}</text>",
                html_escape(&bar.label)
            );
        }

        for line in &self.lines {
            if !line.value.is_finite() {
                continue;
            }
            let y = y_of(line.value);
            let dash = if line.dashed {
                " stroke-dasharray=\"8 5\""
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "<line class=\"ref\" x1=\"{LEFT}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{}\" stroke-width=\"2\"{dash}><title>{}: {}</title></line>",
                LEFT + plot_w,
                line.color,
                html_escape(&line.name),
                fixed(line.value, 2)
            );
        }

        self.render_legend(&mut out);
        out.push_str("</svg>");
        out
    }

    fn render_y_axis(&self, out: &mut String, plot_w: f64, plot_h: f64, y_max: f64) {
        for i in 0..=Y_TICKS {
            let v = y_max * i as f64 / Y_TICKS as f64;
            let y = TOP + plot_h - plot_h * i as f64 / Y_TICKS as f64;
            let _ = writeln!(
                out,
                "<line x1=\"{LEFT}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"#eee\"/>\
<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\" text-anchor=\"end\">{}</text>",
                LEFT + plot_w,
                LEFT - 6.0,
                y + 4.0,
                axis_label(v)
            );
        }
        let mid = TOP + plot_h / 2.0;
        let _ = writeln!(
            out,
            "<text x=\"20\" y=\"{mid:.2}\" font-size=\"14\" text-anchor=\"middle\" transform=\"rotate(-90 20 {mid:.2})\">{}</text>",
            html_escape(&self.y_title)
        );
    }

    fn render_legend(&self, out: &mut String) {
        let mut x = WIDTH - RIGHT - 560.0;
        let y = 24.0;
        let _ = writeln!(
            out,
            "<g class=\"legend\" font-size=\"14\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"570\" height=\"28\" fill=\"rgba(255,255,255,0.8)\" stroke=\"black\"/>",
            x - 10.0,
            y - 18.0
        );
        let _ = writeln!(
            out,
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"14\" height=\"14\" fill=\"{BAR_COLOR}\"/><text x=\"{:.2}\" y=\"{y:.2}\">{}</text>",
            y - 11.0,
            x + 20.0,
            html_escape(&self.series_name)
        );
        x += 220.0;
        for line in &self.lines {
            let dash = if line.dashed {
                " stroke-dasharray=\"6 4\""
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2\"{dash}/><text x=\"{:.2}\" y=\"{y:.2}\">{}</text>",
                y - 4.0,
                x + 24.0,
                y - 4.0,
                line.color,
                x + 30.0,
                html_escape(&line.name)
            );
            x += 170.0;
        }
        out.push_str("</g>\n");
    }
}

/// Round a raw step up to 1, 2, 2.5 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 2.5 {
        2.5
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn axis_label(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        fixed(v, 1)
    }
}
