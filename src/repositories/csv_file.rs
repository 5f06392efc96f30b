use super::ReadingSource;
use crate::error::{AppError, Result};
use crate::models::Reading;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Reads readings from a CSV dump of the SCADA table.
///
/// Expected header (any case, any order):
/// `ID,SETTLEMENTDATE,DUID,SCADAVALUE,LASTCHANGED,IMPORT_TIMESTAMP`.
/// `LASTCHANGED` and `IMPORT_TIMESTAMP` may be absent.
#[derive(Debug, Clone)]
pub struct CsvReadingSource {
    path: PathBuf,
    label: String,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    id: usize,
    settlement: usize,
    duid: usize,
    value: usize,
    last_changed: Option<usize>,
    imported: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> std::result::Result<Self, String> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column {}", name));
        Ok(Self {
            id: require("ID")?,
            settlement: require("SETTLEMENTDATE")?,
            duid: require("DUID")?,
            value: require("SCADAVALUE")?,
            last_changed: find("LASTCHANGED"),
            imported: find("IMPORT_TIMESTAMP"),
        })
    }
}

impl CsvReadingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Reading>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(&self.path)
            .map_err(|e| AppError::fetch(&self.label, e))?;

        let header = reader
            .headers()
            .map_err(|e| AppError::fetch(&self.label, e))?
            .clone();
        let columns =
            Columns::from_header(&header).map_err(|msg| AppError::fetch(&self.label, msg))?;

        let mut readings = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| AppError::fetch(&self.label, e))?;
            // Line 1 is the header.
            readings.push(parse_record(&record, &columns, &self.label, index + 2)?);
        }
        Ok(readings)
    }
}

#[async_trait]
impl ReadingSource for CsvReadingSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        let readings = self.read_all()?;
        info!(path = %self.label, count = readings.len(), "loaded SCADA readings");
        Ok(readings)
    }
}

/// Convert one record. DUID is kept byte for byte; the other cells are trimmed.
///
/// A record whose ID cannot be read has nothing to be named by, so it fails
/// the fetch with its line number instead of a `MalformedInput`.
fn parse_record(record: &StringRecord, columns: &Columns, label: &str, line: usize) -> Result<Reading> {
    let field = |idx: usize| cell(record, idx).trim();

    let raw_id = field(columns.id);
    let id: i64 = raw_id.parse().map_err(|_| {
        AppError::fetch(label, format!("line {}: unreadable ID '{}'", line, raw_id))
    })?;

    let value = match field(columns.value) {
        "" => f64::NAN,
        raw => raw
            .parse()
            .map_err(|_| AppError::malformed(id, format!("SCADAVALUE '{}' is not a number", raw)))?,
    };

    let optional_ts = |idx: Option<usize>, name: &str| -> Result<Option<NaiveDateTime>> {
        match idx {
            Some(idx) => parse_timestamp(field(idx))
                .map_err(|raw| AppError::malformed(id, format!("{} '{}' is not a timestamp", name, raw))),
            None => Ok(None),
        }
    };

    Ok(Reading {
        id,
        timestamp: optional_ts(Some(columns.settlement), "SETTLEMENTDATE")?,
        device_id: cell(record, columns.duid).to_string(),
        value,
        last_changed: optional_ts(columns.last_changed, "LASTCHANGED")?,
        import_timestamp: optional_ts(columns.imported, "IMPORT_TIMESTAMP")?,
    })
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

/// Empty text is a missing timestamp; anything else must parse.
fn parse_timestamp(raw: &str) -> std::result::Result<Option<NaiveDateTime>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| raw.to_string())
}
