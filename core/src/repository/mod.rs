pub mod config;
pub mod file;
pub mod traits;

// Re-export
pub use config::FileConfigRepository;
pub use file::{read_json_array, FileRecordRepository};
pub use traits::RecordRepository;
