pub mod csv_file;
pub mod scada;

pub use csv_file::CsvReadingSource;
pub use scada::ScadaRepository;

use crate::error::Result;
use crate::models::Reading;
use async_trait::async_trait;

/// Supplies the full reading collection for one run.
///
/// Implementations make no ordering promise; callers must not rely on it.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Short label used in logs and fetch errors.
    fn name(&self) -> &str;

    async fn fetch_readings(&self) -> Result<Vec<Reading>>;
}
