use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One SCADA measurement as fetched from the store.
///
/// Timestamps are wall-clock settlement times without an offset. A `None`
/// settlement time means the store had no usable value; the aggregation
/// rejects such readings instead of dropping them. A missing measurement
/// arrives as `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub timestamp: Option<NaiveDateTime>,
    pub device_id: String,
    pub value: f64,
    pub last_changed: Option<NaiveDateTime>,
    pub import_timestamp: Option<NaiveDateTime>,
}
