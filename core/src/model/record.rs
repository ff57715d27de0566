use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::time::parse_record_date;

/// One dated observation with its named metric values.
///
/// The date is kept as received so that validation happens where the records
/// are consumed and can name the offending record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatedRecord {
    pub date: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl DatedRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    /// Value of a metric, 0 when the record does not carry it.
    pub fn metric(&self, key: &str) -> f64 {
        self.metrics.get(key).copied().unwrap_or(0.0)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date).ok()
    }
}
