use crate::model::bucket::{Bucket, Granularity};
use crate::model::record::DatedRecord;
use crate::model::stats::SummaryStats;
use crate::repository::RecordRepository;
use crate::service::aggregator::{filter_by_year, TimeSeriesAggregator};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// The selections a report screen holds: period, granularity and metrics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub granularity: Granularity,
    pub metrics: Vec<String>,
    pub primary: Option<String>,
}

impl ReportQuery {
    pub fn new(granularity: Granularity, metrics: Vec<String>) -> Self {
        Self {
            year: None,
            month: None,
            granularity,
            metrics,
            primary: None,
        }
    }

    pub fn period(mut self, year: i32, month: Option<u32>) -> Self {
        self.year = Some(year);
        self.month = month;
        self
    }

    pub fn primary(mut self, metric: impl Into<String>) -> Self {
        self.primary = Some(metric.into());
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub query: ReportQuery,
    pub buckets: Vec<Bucket>,
    pub summary: SummaryStats,
}

pub struct ReportUseCase<'a, R: RecordRepository> {
    repo: &'a R,
    aggregator: TimeSeriesAggregator,
}

impl<'a, R: RecordRepository> ReportUseCase<'a, R> {
    pub fn new(repo: &'a R, aggregator: TimeSeriesAggregator) -> Self {
        Self { repo, aggregator }
    }

    /// Loads the records and keeps those inside the query's period: the
    /// month when one is given, otherwise the whole year, otherwise all.
    pub fn scoped_records(&self, query: &ReportQuery) -> Result<Vec<DatedRecord>> {
        if query.year.is_none() && query.month.is_some() {
            return Err(anyhow!("A month filter needs a year"));
        }

        let records = self.repo.list()?;
        let scoped = match (query.year, query.month) {
            (Some(year), Some(month)) => self.aggregator.filter_by_period(&records, year, month)?,
            (Some(year), None) => filter_by_year(&records, year)?,
            _ => records,
        };
        Ok(scoped)
    }

    pub fn run(&self, query: &ReportQuery) -> Result<Report> {
        let scoped = self.scoped_records(query)?;

        let buckets = self
            .aggregator
            .aggregate(&scoped, query.granularity, &query.metrics)?;
        let summary = self
            .aggregator
            .summarize(&buckets, &query.metrics, query.primary.as_deref())?;

        info!(
            records = scoped.len(),
            buckets = buckets.len(),
            granularity = %query.granularity,
            "report ready"
        );

        Ok(Report {
            query: query.clone(),
            buckets,
            summary,
        })
    }
}
