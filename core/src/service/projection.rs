use crate::error::ProjectionError;
use crate::model::attendance::{AttendanceStatus, ABSENT_SHIFTS, PRESENT_SHIFTS};
use crate::model::record::DatedRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Maps backend field names onto a date and canonical metric keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    pub date_field: String,
    /// (source field, metric key)
    pub metrics: Vec<(String, String)>,
    /// When set, every numeric field other than the date becomes a metric
    /// under its own name.
    pub passthrough: bool,
    /// Field holding a "Present"/"Absent" status, expanded into shift counts.
    pub status_field: Option<String>,
}

impl FieldMapping {
    pub fn new(date_field: impl Into<String>) -> Self {
        Self {
            date_field: date_field.into(),
            metrics: Vec::new(),
            passthrough: false,
            status_field: None,
        }
    }

    pub fn metric(mut self, source: impl Into<String>, key: impl Into<String>) -> Self {
        self.metrics.push((source.into(), key.into()));
        self
    }

    pub fn passthrough(date_field: impl Into<String>) -> Self {
        Self {
            passthrough: true,
            ..Self::new(date_field)
        }
    }

    /// Per-shift attendance entries or per-staff monthly attendance counts.
    pub fn attendance() -> Self {
        let mut mapping = Self::new("date")
            .metric(PRESENT_SHIFTS, PRESENT_SHIFTS)
            .metric(ABSENT_SHIFTS, ABSENT_SHIFTS);
        mapping.status_field = Some("status".to_string());
        mapping
    }

    pub fn stitching() -> Self {
        Self::new("date").metric("stitchedCount", "stitchedCount")
    }

    pub fn salary() -> Self {
        Self::new("month").metric("salary", "salary")
    }

    pub fn trunks() -> Self {
        Self::new("receivedDate")
            .metric("expectedPayment", "expectedPayment")
            .metric("paymentAmount", "totalPaid")
            .metric("quantity", "quantity")
    }

    /// Metric keys this mapping produces, in declaration order.
    pub fn metric_keys(&self) -> Vec<String> {
        self.metrics.iter().map(|(_, key)| key.clone()).collect()
    }

    pub fn project(&self, index: usize, value: &Value) -> Result<DatedRecord, ProjectionError> {
        let object = value.as_object().ok_or(ProjectionError::NotAnObject { index })?;

        let date = object
            .get(&self.date_field)
            .and_then(Value::as_str)
            .ok_or_else(|| ProjectionError::MissingDate {
                index,
                field: self.date_field.clone(),
            })?;

        let mut record = DatedRecord::new(date);

        if self.passthrough {
            for (field, v) in object {
                if field == &self.date_field {
                    continue;
                }
                if let Some(n) = v.as_f64() {
                    record.metrics.insert(field.clone(), n);
                }
            }
        }

        for (source, key) in &self.metrics {
            if let Some(n) = numeric_field(object, source, index)? {
                record.metrics.insert(key.clone(), n);
            }
        }

        if let Some(status_field) = &self.status_field {
            if let Some(value) = object.get(status_field) {
                // Non-string statuses (null, numbers) are reported as written
                let status = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let (present, absent) = AttendanceStatus::parse(&status)
                    .ok_or_else(|| ProjectionError::UnknownStatus { index, status: status.clone() })?
                    .shift_counts();
                record.metrics.insert(PRESENT_SHIFTS.to_string(), present);
                record.metrics.insert(ABSENT_SHIFTS.to_string(), absent);
            }
        }

        Ok(record)
    }

    pub fn project_all(&self, values: &[Value]) -> Result<Vec<DatedRecord>, ProjectionError> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.project(i, v))
            .collect()
    }
}

// Form inputs reach the backend as strings, so numeric strings are accepted.
fn numeric_field(
    object: &Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<Option<f64>, ProjectionError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            // "NaN" and "inf" parse as floats but are not counts
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(ProjectionError::NonNumeric {
                index,
                field: field.to_string(),
            }),
        },
        Some(_) => Err(ProjectionError::NonNumeric {
            index,
            field: field.to_string(),
        }),
    }
}

/// The record sets the backend serves, each with its own field layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dataset {
    Attendance,
    Stitching,
    Salary,
    Trunks,
    /// Already flat `{date, metric...}` records.
    #[default]
    Records,
}

impl Dataset {
    pub fn mapping(self) -> FieldMapping {
        match self {
            Dataset::Attendance => FieldMapping::attendance(),
            Dataset::Stitching => FieldMapping::stitching(),
            Dataset::Salary => FieldMapping::salary(),
            Dataset::Trunks => FieldMapping::trunks(),
            Dataset::Records => FieldMapping::passthrough("date"),
        }
    }

    /// Metrics reported when the caller does not ask for specific ones.
    pub fn default_metrics(self) -> Vec<String> {
        self.mapping().metric_keys()
    }

    /// The metric whose consistency ratio is of interest, if any.
    pub fn default_primary(self) -> Option<&'static str> {
        match self {
            Dataset::Attendance => Some(PRESENT_SHIFTS),
            Dataset::Stitching => Some("stitchedCount"),
            Dataset::Salary => Some("salary"),
            Dataset::Trunks => None,
            Dataset::Records => None,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dataset::Attendance => "attendance",
            Dataset::Stitching => "stitching",
            Dataset::Salary => "salary",
            Dataset::Trunks => "trunks",
            Dataset::Records => "records",
        };
        f.write_str(s)
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attendance" => Ok(Dataset::Attendance),
            "stitching" => Ok(Dataset::Stitching),
            "salary" => Ok(Dataset::Salary),
            "trunks" | "pieces" => Ok(Dataset::Trunks),
            "records" => Ok(Dataset::Records),
            _ => Err(format!("unknown dataset '{}'", s)),
        }
    }
}
