pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::AppConfig;
pub use error::{AggregateError, AggregateResult, ProjectionError, SalaryError};
pub use model::bucket::{Bucket, BucketKey, BucketOrder, Granularity};
pub use model::record::DatedRecord;
pub use model::stats::{MetricSummary, SummaryStats};
pub use repository::{FileConfigRepository, FileRecordRepository, RecordRepository};
pub use service::aggregator::{aggregate, filter_by_period, summarize, TimeSeriesAggregator};
pub use service::projection::{Dataset, FieldMapping};
pub use service::salary_service::SalaryService;
pub use usecase::report::{Report, ReportQuery, ReportUseCase};
