use crate::error::{AppError, Result};
use crate::models::{BucketKey, Reading, Summaries, SummaryRow, SummaryTable, TableKind};
use chrono::Timelike;
use std::collections::BTreeMap;
use tracing::debug;

/// Running statistics for one bucket.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Self {
            count: 1,
            sum: value,
            min: value,
            max: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if value.total_cmp(&self.min).is_lt() {
            self.min = value;
        }
        if value.total_cmp(&self.max).is_gt() {
            self.max = value;
        }
    }

    fn finish(self, key: BucketKey) -> SummaryRow {
        let mut avg = self.sum / self.count as f64;
        // Rounding in the sum can push the mean one ulp past the extremes.
        if self.min <= self.max {
            avg = avg.max(self.min).min(self.max);
        }
        SummaryRow {
            key,
            record_count: self.count,
            avg_value: avg,
            min_value: self.min,
            max_value: self.max,
            sum_value: self.sum,
        }
    }
}

/// Derive the bucket a reading belongs to in the given table.
///
/// Fails with `MalformedInput` when the reading has no settlement timestamp
/// and the table is time-keyed.
pub fn bucket_key(kind: TableKind, reading: &Reading) -> Result<BucketKey> {
    match kind {
        TableKind::ByDevice => Ok(BucketKey::Device(reading.device_id.clone())),
        TableKind::Daily | TableKind::Hourly => {
            let ts = reading
                .timestamp
                .ok_or_else(|| AppError::malformed(reading.id, "settlement timestamp missing"))?;
            Ok(match kind {
                TableKind::Daily => BucketKey::Day(ts.date()),
                _ => BucketKey::Hour(ts.hour()),
            })
        }
    }
}

/// Build the daily, per-device and hourly summaries in one pass over `readings`.
///
/// Input order does not matter. Daily rows come out by ascending date, hourly
/// rows by ascending hour, device rows by descending average with ties broken
/// by ascending device id. Any reading without a timestamp aborts the whole
/// aggregation.
pub fn aggregate(readings: &[Reading]) -> Result<Summaries> {
    let mut groups: [BTreeMap<BucketKey, Accumulator>; 3] = Default::default();

    for reading in readings {
        for (kind, group) in TableKind::ALL.iter().zip(groups.iter_mut()) {
            let key = bucket_key(*kind, reading)?;
            group
                .entry(key)
                .and_modify(|acc| acc.push(reading.value))
                .or_insert_with(|| Accumulator::new(reading.value));
        }
    }

    let [daily, by_device, hourly] = groups.map(|group| {
        group
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect::<Vec<_>>()
    });

    let mut by_device = by_device;
    rank_by_average(&mut by_device);

    debug!(
        readings = readings.len(),
        days = daily.len(),
        devices = by_device.len(),
        hours = hourly.len(),
        "aggregation complete"
    );

    Ok(Summaries {
        daily: SummaryTable {
            kind: TableKind::Daily,
            rows: daily,
        },
        by_device: SummaryTable {
            kind: TableKind::ByDevice,
            rows: by_device,
        },
        hourly: SummaryTable {
            kind: TableKind::Hourly,
            rows: hourly,
        },
    })
}

/// Descending by average, ascending by key on ties.
fn rank_by_average(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| {
        b.avg_value
            .total_cmp(&a.avg_value)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// First `n` rows of a ranked table (all of them when it is shorter).
pub fn top_n(rows: &[SummaryRow], n: usize) -> &[SummaryRow] {
    &rows[..n.min(rows.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn reading(id: i64, device: &str, at: &str, value: f64) -> Reading {
        Reading {
            id,
            timestamp: Some(ts(at)),
            device_id: device.into(),
            value,
            last_changed: None,
            import_timestamp: None,
        }
    }

    fn row(key: BucketKey, count: u64, avg: f64, min: f64, max: f64, sum: f64) -> SummaryRow {
        SummaryRow {
            key,
            record_count: count,
            avg_value: avg,
            min_value: min,
            max_value: max,
            sum_value: sum,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> BucketKey {
        BucketKey::Day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_three_reading_scenario() {
        let readings = vec![
            reading(1, "G1", "2024-01-01T00:00", 10.0),
            reading(2, "G1", "2024-01-01T13:00", 30.0),
            reading(3, "G2", "2024-01-02T05:00", 20.0),
        ];

        let s = aggregate(&readings).unwrap();

        assert_eq!(
            s.daily.rows,
            vec![
                row(day(2024, 1, 1), 2, 20.0, 10.0, 30.0, 40.0),
                row(day(2024, 1, 2), 1, 20.0, 20.0, 20.0, 20.0),
            ]
        );
        assert_eq!(
            s.by_device.rows,
            vec![
                row(BucketKey::Device("G1".into()), 2, 20.0, 10.0, 30.0, 40.0),
                row(BucketKey::Device("G2".into()), 1, 20.0, 20.0, 20.0, 20.0),
            ]
        );
        assert_eq!(
            s.hourly.rows,
            vec![
                row(BucketKey::Hour(0), 1, 10.0, 10.0, 10.0, 10.0),
                row(BucketKey::Hour(5), 1, 20.0, 20.0, 20.0, 20.0),
                row(BucketKey::Hour(13), 1, 30.0, 30.0, 30.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        let s = aggregate(&[]).unwrap();
        assert!(s.daily.is_empty());
        assert!(s.by_device.is_empty());
        assert!(s.hourly.is_empty());
        assert_eq!(s.by_device.kind, TableKind::ByDevice);
    }

    #[test]
    fn test_unsorted_input_is_ordered() {
        let readings = vec![
            reading(1, "B", "2024-03-05T23:10", 1.0),
            reading(2, "A", "2024-03-01T02:00", 5.0),
            reading(3, "C", "2024-03-03T11:30", 3.0),
        ];
        let s = aggregate(&readings).unwrap();

        let days: Vec<String> = s.daily.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(days, vec!["2024-03-01", "2024-03-03", "2024-03-05"]);

        let devices: Vec<String> = s.by_device.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(devices, vec!["A", "C", "B"]);

        let hours: Vec<String> = s.hourly.rows.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(hours, vec!["2", "11", "23"]);
    }

    #[test]
    fn test_hourly_merges_calendar_days() {
        let readings = vec![
            reading(1, "G1", "2024-01-01T07:15", 2.0),
            reading(2, "G1", "2024-01-02T07:45", 4.0),
            reading(3, "G1", "2024-02-09T07:00", 6.0),
        ];
        let s = aggregate(&readings).unwrap();
        assert_eq!(
            s.hourly.rows,
            vec![row(BucketKey::Hour(7), 3, 4.0, 2.0, 6.0, 12.0)]
        );
    }

    #[test]
    fn test_missing_timestamp_names_record() {
        let mut bad = reading(77, "G1", "2024-01-01T00:00", 1.0);
        bad.timestamp = None;
        let readings = vec![reading(1, "G1", "2024-01-01T00:00", 1.0), bad];

        match aggregate(&readings) {
            Err(AppError::MalformedInput { id, .. }) => assert_eq!(id, 77),
            other => panic!("expected malformed input, got {:?}", other),
        }
    }

    #[test]
    fn test_device_key_does_not_need_timestamp() {
        let mut r = reading(5, "G9", "2024-01-01T00:00", 1.0);
        r.timestamp = None;
        assert_eq!(
            bucket_key(TableKind::ByDevice, &r).unwrap(),
            BucketKey::Device("G9".into())
        );
        assert!(bucket_key(TableKind::Hourly, &r).is_err());
    }

    #[test]
    fn test_nan_value_propagates() {
        let readings = vec![
            reading(1, "G1", "2024-01-01T00:00", 1.0),
            reading(2, "G1", "2024-01-01T01:00", f64::NAN),
        ];
        let s = aggregate(&readings).unwrap();
        let r = &s.daily.rows[0];
        assert_eq!(r.record_count, 2);
        assert!(r.sum_value.is_nan());
        assert!(r.avg_value.is_nan());
        assert_eq!(r.min_value, 1.0);
        assert!(r.max_value.is_nan());
    }

    #[test]
    fn test_mean_stays_within_extremes() {
        let readings: Vec<Reading> = (0..3)
            .map(|i| reading(i, "G1", "2024-01-01T00:00", 0.1))
            .collect();
        let s = aggregate(&readings).unwrap();
        let r = &s.daily.rows[0];
        assert!(r.min_value <= r.avg_value && r.avg_value <= r.max_value);
        assert!((r.sum_value - r.avg_value * 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_n() {
        let readings: Vec<Reading> = (0..15)
            .map(|i| reading(i, &format!("D{:02}", i), "2024-01-01T00:00", i as f64))
            .collect();
        let s = aggregate(&readings).unwrap();

        let top = top_n(&s.by_device.rows, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top, &s.by_device.rows[..10]);
        assert_eq!(top[0].key, BucketKey::Device("D14".into()));

        assert_eq!(top_n(&s.by_device.rows[..3], 10).len(), 3);
        assert!(top_n(&[], 10).is_empty());
    }
}
