use crate::models::{SummaryRow, SummaryTable};
use std::fmt::Write;

/// Render rows as a right-aligned text table for the run log.
pub fn format_table(table: &SummaryTable, rows: &[SummaryRow]) -> String {
    let header = table.header();
    let cells: Vec<[String; 6]> = rows
        .iter()
        .map(|r| {
            [
                r.key.to_string(),
                r.record_count.to_string(),
                format!("{:.3}", r.avg_value),
                format!("{:.3}", r.min_value),
                format!("{:.3}", r.max_value),
                format!("{:.3}", r.sum_value),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = width))
        .collect();
    let _ = writeln!(out, "{}", line.join("  "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BucketKey, TableKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_table_aligns_columns() {
        let table = SummaryTable {
            kind: TableKind::Hourly,
            rows: vec![SummaryRow {
                key: BucketKey::Hour(13),
                record_count: 1,
                avg_value: 30.0,
                min_value: 30.0,
                max_value: 30.0,
                sum_value: 30.0,
            }],
        };
        let text = format_table(&table, &table.rows);
        assert_eq!(
            text,
            "Hour  RecordCount  AvgValue  MinValue  MaxValue  TotalValue\n  \
             13            1    30.000    30.000    30.000      30.000\n"
        );
    }

    #[test]
    fn test_format_empty_table() {
        let table = SummaryTable {
            kind: TableKind::Daily,
            rows: vec![],
        };
        assert!(format_table(&table, &[]).ends_with("(no rows)\n"));
    }
}
