use super::ReadingSource;
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::Reading;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{postgres::PgRow, FromRow, Row};
use tracing::info;

/// Reads the SCADA measurement table from PostgreSQL.
#[derive(Clone)]
pub struct ScadaRepository {
    pool: DbPool,
    table: String,
}

impl<'r> FromRow<'r, PgRow> for Reading {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let device_id: Option<String> = row.try_get("duid")?;
        let value: Option<f64> = row.try_get("scadavalue")?;
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: row.try_get::<Option<NaiveDateTime>, _>("settlementdate")?,
            device_id: device_id.unwrap_or_default(),
            value: value.unwrap_or(f64::NAN),
            last_changed: row.try_get("lastchanged")?,
            import_timestamp: row.try_get("import_timestamp")?,
        })
    }
}

impl ScadaRepository {
    /// `table` must already be validated as an identifier (see `Config::validate`).
    pub fn new(pool: DbPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn select_sql(&self) -> String {
        format!(
            r#"
            SELECT
                CAST(id AS BIGINT) AS id,
                settlementdate,
                duid,
                CAST(scadavalue AS DOUBLE PRECISION) AS scadavalue,
                lastchanged,
                import_timestamp
            FROM {}
            ORDER BY settlementdate
            "#,
            self.table
        )
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReadingSource for ScadaRepository {
    fn name(&self) -> &str {
        &self.table
    }

    async fn fetch_readings(&self) -> Result<Vec<Reading>> {
        let readings = sqlx::query_as::<_, Reading>(&self.select_sql())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::fetch(self.name(), e))?;

        info!(table = %self.table, count = readings.len(), "fetched SCADA readings");
        Ok(readings)
    }
}
