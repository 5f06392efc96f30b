use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grouping key of one summary row. Each table uses exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BucketKey {
    Day(NaiveDate),
    Device(String),
    /// Hour of day in 0..=23, shared by every calendar day.
    Hour(u32),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Device(id) => f.write_str(id),
            BucketKey::Hour(hour) => write!(f, "{}", hour),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub key: BucketKey,
    pub record_count: u64,
    pub avg_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub sum_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Daily,
    ByDevice,
    Hourly,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Daily, TableKind::ByDevice, TableKind::Hourly];

    pub fn name(self) -> &'static str {
        match self {
            TableKind::Daily => "daily",
            TableKind::ByDevice => "by_device",
            TableKind::Hourly => "hourly",
        }
    }

    /// Header of the key column in exports and console tables.
    pub fn key_column(self) -> &'static str {
        match self {
            TableKind::Daily => "Date",
            TableKind::ByDevice => "DUID",
            TableKind::Hourly => "Hour",
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            TableKind::Daily => "daily_summary",
            TableKind::ByDevice => "duid_summary",
            TableKind::Hourly => "hourly_summary",
        }
    }
}

/// Statistic columns shared by every table, in export order.
pub const STAT_COLUMNS: [&str; 5] = ["RecordCount", "AvgValue", "MinValue", "MaxValue", "TotalValue"];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub kind: TableKind,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full header row: key column followed by the statistic columns.
    pub fn header(&self) -> Vec<&'static str> {
        let mut header = Vec::with_capacity(STAT_COLUMNS.len() + 1);
        header.push(self.kind.key_column());
        header.extend_from_slice(&STAT_COLUMNS);
        header
    }
}

/// The three tables produced by one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summaries {
    pub daily: SummaryTable,
    pub by_device: SummaryTable,
    pub hourly: SummaryTable,
}

impl Summaries {
    pub fn table(&self, kind: TableKind) -> &SummaryTable {
        match kind {
            TableKind::Daily => &self.daily,
            TableKind::ByDevice => &self.by_device,
            TableKind::Hourly => &self.hourly,
        }
    }
}
