use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::bucket::{BucketOrder, Granularity};
use crate::model::staff::SalaryRates;

pub const HOME_ENV: &str = "STITCHLINE_HOME";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// User defaults for reports, stored as `config.json` in the data directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub rates: SalaryRates,
    pub granularity: Granularity,
    pub bucket_order: BucketOrder,
    /// Short names accepted in place of metric keys, e.g. "pieces" -> "stitchedCount".
    pub metric_aliases: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let metric_aliases = [
            ("pieces", "stitchedCount"),
            ("present", "presentShifts"),
            ("absent", "absentShifts"),
            ("paid", "totalPaid"),
        ]
        .into_iter()
        .map(|(a, k)| (a.to_string(), k.to_string()))
        .collect();

        Self {
            rates: SalaryRates::default(),
            granularity: Granularity::Daily,
            bucket_order: BucketOrder::Chronological,
            metric_aliases,
        }
    }
}

impl AppConfig {
    /// Resolves an alias to its metric key; unknown names pass through.
    pub fn resolve_metric<'a>(&'a self, name: &'a str) -> &'a str {
        self.metric_aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}
