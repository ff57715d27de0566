use thiserror::Error;

/// Failures raised while bucketing or summarizing dated records.
///
/// All of these are deterministic for a given input; nothing here is retryable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregateError {
    #[error("malformed record at index {index}: unparseable date '{date}'")]
    MalformedRecord { index: usize, date: String },

    #[error("at least one metric key is required")]
    EmptyMetricKeys,

    #[error("invalid period: month {month} is outside 1..=12")]
    InvalidPeriod { month: u32 },

    #[error("invalid period: year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i32 },

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
}

pub type AggregateResult<T> = Result<T, AggregateError>;

/// Failures raised while turning backend JSON objects into dated records.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record {index} has no '{field}' date field")]
    MissingDate { index: usize, field: String },

    #[error("record {index}: field '{field}' is not numeric")]
    NonNumeric { index: usize, field: String },

    #[error("record {index}: unknown attendance status '{status}'")]
    UnknownStatus { index: usize, status: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SalaryError {
    #[error("rate '{name}' must not be negative (got {value})")]
    InvalidRate { name: &'static str, value: f64 },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("staff '{id}': {source}")]
    Records { id: String, source: ProjectionError },
}
