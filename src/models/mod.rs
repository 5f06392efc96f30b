pub mod reading;
pub mod summary;

pub use reading::Reading;
pub use summary::{BucketKey, Summaries, SummaryRow, SummaryTable, TableKind};
