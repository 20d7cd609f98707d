//! Data models for the indexing pipeline

pub mod batch;
pub mod file_record;

pub use batch::Batch;
pub use file_record::{FileRecord, FilenameFields, RecordDuration};
