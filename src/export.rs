use crate::error::{AppError, Result};
use crate::models::{Summaries, SummaryRow, SummaryTable, TableKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destinations of the three CSV exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub daily: PathBuf,
    pub by_device: PathBuf,
    pub hourly: PathBuf,
}

impl ExportPaths {
    pub fn get(&self, kind: TableKind) -> &Path {
        match kind {
            TableKind::Daily => &self.daily,
            TableKind::ByDevice => &self.by_device,
            TableKind::Hourly => &self.hourly,
        }
    }
}

/// `f64` Display prints the shortest text that parses back to the same bits.
fn format_value(value: f64) -> String {
    value.to_string()
}

fn record(row: &SummaryRow) -> [String; 6] {
    [
        row.key.to_string(),
        row.record_count.to_string(),
        format_value(row.avg_value),
        format_value(row.min_value),
        format_value(row.max_value),
        format_value(row.sum_value),
    ]
}

/// Serialize `table` as CSV (header + one line per row, in table order).
pub fn write_table_to<W: Write>(table: &SummaryTable, out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.header())?;
    for row in &table.rows {
        writer.write_record(record(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `table` to `dest`. Errors name the table and the destination.
pub fn write_table(table: &SummaryTable, dest: &Path) -> Result<()> {
    let wrap = |source: csv::Error| AppError::ExportWrite {
        table: table.kind.name(),
        path: dest.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(dest).map_err(|e| wrap(e.into()))?;
    write_table_to(table, file).map_err(wrap)?;

    info!(table = table.kind.name(), rows = table.len(), path = %dest.display(), "summary exported");
    Ok(())
}

/// Write daily, per-device and hourly exports, stopping at the first failure.
pub fn write_all(summaries: &Summaries, paths: &ExportPaths) -> Result<()> {
    for kind in TableKind::ALL {
        write_table(summaries.table(kind), paths.get(kind))?;
    }
    Ok(())
}
