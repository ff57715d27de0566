use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::model::record::DatedRecord;
use crate::repository::traits::RecordRepository;
use crate::service::projection::{Dataset, FieldMapping};

/// Reads backend responses saved as JSON and projects them into records.
#[derive(Clone)]
pub struct FileRecordRepository {
    file_path: PathBuf,
    mapping: FieldMapping,
}

impl FileRecordRepository {
    pub fn new(file_path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        Self::with_mapping(file_path, dataset.mapping())
    }

    pub fn with_mapping(file_path: impl Into<PathBuf>, mapping: FieldMapping) -> Self {
        Self {
            file_path: file_path.into(),
            mapping,
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }
}

impl RecordRepository for FileRecordRepository {
    fn list(&self) -> Result<Vec<DatedRecord>> {
        let values = read_values(&self.file_path)?;
        let records = self
            .mapping
            .project_all(&values)
            .with_context(|| format!("Could not read records from {}", self.file_path.display()))?;
        debug!(path = %self.file_path.display(), count = records.len(), "loaded records");
        Ok(records)
    }
}

/// Reads a JSON array of `T` from a file.
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let values = read_values(path)?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value(v)
                .with_context(|| format!("Invalid entry {} in {}", i, path.display()))
        })
        .collect()
}

// Accepts either a bare array or the `{ "type": ..., "data": [...] }` envelope
// some endpoints answer with.
fn read_values(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let reader = BufReader::new(file);
    let value: Value = serde_json::from_reader(reader)
        .with_context(|| format!("Could not parse JSON in {}", path.display()))?;

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(anyhow!("Expected a JSON array in {}", path.display())),
        },
        _ => Err(anyhow!("Expected a JSON array in {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::trunk::Trunk;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_list_stitching_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stitching.json");
        fs::write(
            &path,
            r#"[{"date":"2024-03-05","shift":"Morning","tailorId":"t1","stitchedCount":40},
                {"date":"2024-03-12","shift":"Evening","tailorId":"t1","stitchedCount":60}]"#,
        )
        .unwrap();

        let repo = FileRecordRepository::new(&path, Dataset::Stitching);
        let records = repo.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].metric("stitchedCount"), 60.0);
    }

    #[test]
    fn test_list_unwraps_data_envelope() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attendance.json");
        fs::write(
            &path,
            r#"{"type":"attendance","data":[{"staffId":"s1","date":"2024-01-01","shift":"Morning","status":"Present"}]}"#,
        )
        .unwrap();

        let records = FileRecordRepository::new(&path, Dataset::Attendance).list().unwrap();
        assert_eq!(records[0].metric("presentShifts"), 1.0);
    }

    #[test]
    fn test_list_reports_projection_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"[{"stitchedCount":40}]"#).unwrap();

        let err = FileRecordRepository::new(&path, Dataset::Stitching).list().unwrap_err();
        assert!(format!("{:#}", err).contains("no 'date' date field"));
    }

    #[test]
    fn test_missing_file() {
        let repo = FileRecordRepository::new("/nonexistent/records.json", Dataset::Records);
        assert!(repo.list().is_err());
    }

    #[test]
    fn test_read_json_array_typed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trunks.json");
        fs::write(&path, r#"[{"trunkNumber":"T-1","expectedPayment":100,"paymentAmount":100,"isDispatched":true}]"#).unwrap();

        let trunks: Vec<Trunk> = read_json_array(&path).unwrap();
        assert_eq!(trunks.len(), 1);
        assert!(trunks[0].is_dispatched);

        fs::write(&path, r#"{"trunkNumber":"T-1"}"#).unwrap();
        assert!(read_json_array::<Trunk>(&path).is_err());
    }
}
