use crate::aggregation::top_n;
use crate::models::{BucketKey, Summaries, SummaryRow};

pub const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    TriangleUp,
    TriangleDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Discrete labels in display order.
    Categories(Vec<String>),
    /// Always ticks 0..=23, whatever hours have data.
    HourOfDay,
}

impl XAxis {
    pub fn tick_count(&self) -> usize {
        match self {
            XAxis::Categories(labels) => labels.len(),
            XAxis::HourOfDay => HOURS_PER_DAY as usize,
        }
    }
}

/// One plotted series; `values[i]` belongs to the i-th x tick, `None` is a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub marker: Option<MarkerShape>,
    pub values: Vec<Option<f64>>,
}

/// Everything needed to draw one page of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    /// 1-based position in the document.
    pub number: usize,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub chart: ChartKind,
    pub x_axis: XAxis,
    pub series: Vec<Series>,
    pub show_legend: bool,
}

impl PageSpec {
    /// Every series must carry exactly one value per tick.
    pub fn validate(&self) -> Result<(), String> {
        if self.series.is_empty() {
            return Err("page has no series".into());
        }
        let ticks = self.x_axis.tick_count();
        match self.series.iter().find(|s| s.values.len() != ticks) {
            Some(s) => Err(format!(
                "series '{}' has {} values for {} ticks",
                s.label,
                s.values.len(),
                ticks
            )),
            None => Ok(()),
        }
    }
}

fn labels(rows: &[SummaryRow]) -> Vec<String> {
    rows.iter().map(|r| r.key.to_string()).collect()
}

fn column(rows: &[SummaryRow], stat: impl Fn(&SummaryRow) -> f64) -> Vec<Option<f64>> {
    rows.iter().map(|r| Some(stat(r))).collect()
}

/// Spread hourly rows onto the fixed 0..=23 axis.
fn by_hour(rows: &[SummaryRow], stat: impl Fn(&SummaryRow) -> f64) -> Vec<Option<f64>> {
    let mut values = vec![None; HOURS_PER_DAY as usize];
    for row in rows {
        if let BucketKey::Hour(h) = row.key {
            if let Some(slot) = values.get_mut(h as usize) {
                *slot = Some(stat(row));
            }
        }
    }
    values
}

fn single(label: &str, color: &'static str, marker: Option<MarkerShape>, values: Vec<Option<f64>>) -> Vec<Series> {
    vec![Series {
        label: label.into(),
        color,
        marker,
        values,
    }]
}

/// The six report pages, in document order.
pub fn build_pages(summaries: &Summaries, top_devices: usize) -> Vec<PageSpec> {
    let daily = &summaries.daily.rows;
    let hourly = &summaries.hourly.rows;
    let ranked = top_n(&summaries.by_device.rows, top_devices);
    let day_axis = XAxis::Categories(labels(daily));

    vec![
        PageSpec {
            number: 1,
            title: "SCADA record count by day".into(),
            x_label: "Date".into(),
            y_label: "Record count".into(),
            chart: ChartKind::Bar,
            x_axis: day_axis.clone(),
            series: single("Records", "skyblue", None, column(daily, |r| r.record_count as f64)),
            show_legend: false,
        },
        PageSpec {
            number: 2,
            title: "Average SCADAVALUE by day".into(),
            x_label: "Date".into(),
            y_label: "Average SCADAVALUE".into(),
            chart: ChartKind::Line,
            x_axis: day_axis.clone(),
            series: single("Average", "green", Some(MarkerShape::Circle), column(daily, |r| r.avg_value)),
            show_legend: false,
        },
        PageSpec {
            number: 3,
            title: "Maximum and minimum SCADAVALUE by day".into(),
            x_label: "Date".into(),
            y_label: "SCADAVALUE".into(),
            chart: ChartKind::Line,
            x_axis: day_axis,
            series: vec![
                Series {
                    label: "Maximum".into(),
                    color: "red",
                    marker: Some(MarkerShape::TriangleUp),
                    values: column(daily, |r| r.max_value),
                },
                Series {
                    label: "Minimum".into(),
                    color: "blue",
                    marker: Some(MarkerShape::TriangleDown),
                    values: column(daily, |r| r.min_value),
                },
            ],
            show_legend: true,
        },
        PageSpec {
            number: 4,
            title: format!("Top {} DUID by average SCADAVALUE", top_devices),
            x_label: "DUID".into(),
            y_label: "Average SCADAVALUE".into(),
            chart: ChartKind::Bar,
            x_axis: XAxis::Categories(labels(ranked)),
            series: single("Average", "orange", None, column(ranked, |r| r.avg_value)),
            show_legend: false,
        },
        PageSpec {
            number: 5,
            title: "Average SCADAVALUE by hour of day".into(),
            x_label: "Hour".into(),
            y_label: "Average SCADAVALUE".into(),
            chart: ChartKind::Line,
            x_axis: XAxis::HourOfDay,
            series: single("Average", "purple", Some(MarkerShape::Circle), by_hour(hourly, |r| r.avg_value)),
            show_legend: false,
        },
        PageSpec {
            number: 6,
            title: "SCADA record count by hour of day".into(),
            x_label: "Hour".into(),
            y_label: "Record count".into(),
            chart: ChartKind::Bar,
            x_axis: XAxis::HourOfDay,
            series: single("Records", "teal", None, by_hour(hourly, |r| r.record_count as f64)),
            show_legend: false,
        },
    ]
}
