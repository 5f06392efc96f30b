use crate::aggregation::{aggregate, top_n};
use crate::config::OutputConfig;
use crate::error::{AppError, Result};
use crate::export::{self, ExportPaths};
use crate::models::{Summaries, TableKind};
use crate::report::render_report;
use crate::repositories::ReadingSource;
use crate::summary::format_table;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub report: PathBuf,
    pub exports: ExportPaths,
}

impl ArtifactPaths {
    /// `scada_analysis_<stamp>.html` plus `<table>_summary_<stamp>.csv` under `dir`.
    pub fn timestamped(dir: &Path, at: NaiveDateTime) -> Self {
        let stamp = at.format("%Y%m%d_%H%M%S").to_string();
        let csv = |kind: TableKind| dir.join(format!("{}_{}.csv", kind.file_stem(), stamp));
        Self {
            report: dir.join(format!("scada_analysis_{}.html", stamp)),
            exports: ExportPaths {
                daily: csv(TableKind::Daily),
                by_device: csv(TableKind::ByDevice),
                hourly: csv(TableKind::Hourly),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub readings: usize,
    pub summaries: Summaries,
    pub artifacts: ArtifactPaths,
}

/// Fetch, aggregate, then write the report and the three exports.
///
/// The first failure aborts the run; artifacts written before it stay on disk.
pub async fn run(
    output: &OutputConfig,
    source: &dyn ReadingSource,
    generated_at: NaiveDateTime,
) -> Result<RunOutcome> {
    let readings = source.fetch_readings().await?;

    info!(readings = readings.len(), "analysing readings");
    let summaries = aggregate(&readings)?;
    log_summaries(&summaries, output.top_n);

    std::fs::create_dir_all(&output.dir).map_err(|source| AppError::OutputDir {
        path: output.dir.clone(),
        source,
    })?;
    let artifacts = ArtifactPaths::timestamped(&output.dir, generated_at);

    render_report(&summaries, output.top_n, generated_at, &artifacts.report)?;
    export::write_all(&summaries, &artifacts.exports)?;

    info!(dir = %output.dir.display(), "analysis complete");
    Ok(RunOutcome {
        readings: readings.len(),
        summaries,
        artifacts,
    })
}

fn log_summaries(summaries: &Summaries, top_devices: usize) {
    let daily = &summaries.daily;
    info!(
        "daily summary:\n{}",
        format_table(daily, &daily.rows)
    );

    let by_device = &summaries.by_device;
    info!(
        "top {} DUID by average SCADAVALUE:\n{}",
        top_devices,
        format_table(by_device, top_n(&by_device.rows, top_devices))
    );

    let hourly = &summaries.hourly;
    info!(
        "hourly summary:\n{}",
        format_table(hourly, &hourly.rows)
    );
}
