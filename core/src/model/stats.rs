use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MetricSummary {
    pub total: f64,
    pub peak: f64,
    pub average: f64,
    /// Average over peak; only present for the primary metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_ratio: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub bucket_count: usize,
    pub primary: Option<String>,
    pub metrics: BTreeMap<String, MetricSummary>, // Key: metric name
}

impl SummaryStats {
    pub fn metric(&self, key: &str) -> Option<&MetricSummary> {
        self.metrics.get(key)
    }

    pub fn consistency_ratio(&self) -> Option<f64> {
        let primary = self.primary.as_deref()?;
        self.metrics.get(primary)?.consistency_ratio
    }

    /// Sum of every metric's total.
    pub fn grand_total(&self) -> f64 {
        self.metrics.values().map(|m| m.total).sum()
    }
}
