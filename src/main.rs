use anyhow::Context;
use scada_report::config::{Config, SourceConfig};
use scada_report::repositories::{CsvReadingSource, ScadaRepository};
use scada_report::{db, pipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting SCADA data analysis");

    let cfg_path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.yaml".into());
    let cfg = Config::load(&cfg_path).with_context(|| format!("loading config {}", cfg_path))?;
    info!("Configuration loaded");

    let generated_at = chrono::Local::now().naive_local();

    let result = match &cfg.source {
        SourceConfig::Postgres(db_cfg) => {
            let pool = db::connect(db_cfg).await.context("connecting to database")?;
            info!(table = %db_cfg.table, "Connected to database");
            let repo = ScadaRepository::new(pool, db_cfg.table.clone());
            let result = pipeline::run(&cfg.output, &repo, generated_at).await;
            repo.close().await;
            info!("Database connection closed");
            result
        }
        SourceConfig::Csv { path } => {
            let source = CsvReadingSource::new(path.clone());
            pipeline::run(&cfg.output, &source, generated_at).await
        }
    };

    match result {
        Ok(outcome) => {
            info!(
                readings = outcome.readings,
                report = %outcome.artifacts.report.display(),
                "Results saved to {}",
                cfg.output.dir.display()
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "analysis aborted");
            Err(e.into())
        }
    }
}
