use serde::{Deserialize, Serialize};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::time::{iso_week_of, month_name};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    /// The granularity after this one, wrapping around. Used by the chart view.
    pub fn next(self) -> Self {
        match self {
            Granularity::Daily => Granularity::Weekly,
            Granularity::Weekly => Granularity::Monthly,
            Granularity::Monthly => Granularity::Daily,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d" | "day" | "daily" => Ok(Granularity::Daily),
            "w" | "week" | "weekly" => Ok(Granularity::Weekly),
            "m" | "month" | "monthly" => Ok(Granularity::Monthly),
            _ => Err(format!("unknown granularity '{}' (expected daily, weekly or monthly)", s)),
        }
    }
}

/// How emitted buckets are ordered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketOrder {
    /// Calendar order of the bucket keys.
    #[default]
    Chronological,
    /// Plain string order of the labels ("Week 10" before "Week 2",
    /// "April" before "January"), matching the legacy dashboards.
    Lexicographic,
}

/// Identifies one time bucket. The derived ordering is chronological within
/// a granularity; keys of different granularities are never mixed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BucketKey {
    Day { date: NaiveDate },
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl BucketKey {
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Daily => BucketKey::Day { date },
            Granularity::Weekly => {
                let (year, week) = iso_week_of(date);
                BucketKey::Week { year, week }
            }
            Granularity::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }

    /// Display label: the date for days, "Week N" for ISO weeks and the month
    /// name for months.
    pub fn label(&self) -> String {
        match self {
            BucketKey::Day { date } => date.format("%Y-%m-%d").to_string(),
            BucketKey::Week { week, .. } => format!("Week {}", week),
            BucketKey::Month { month, .. } => month_name(*month).unwrap_or("Unknown").to_string(),
        }
    }
}

/// Metric sums for one time bucket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub label: String,
    pub metrics: BTreeMap<String, f64>,
}

impl Bucket {
    pub fn new(key: BucketKey, metric_keys: &[String]) -> Self {
        Self {
            key,
            label: key.label(),
            metrics: metric_keys.iter().map(|k| (k.clone(), 0.0)).collect(),
        }
    }

    pub fn value(&self, metric: &str) -> f64 {
        self.metrics.get(metric).copied().unwrap_or(0.0)
    }
}
