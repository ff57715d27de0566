use crate::model::record::DatedRecord;
use anyhow::Result;

pub trait RecordRepository {
    fn list(&self) -> Result<Vec<DatedRecord>>;
}
