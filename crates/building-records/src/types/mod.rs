//! Core types for building record processing

pub mod record;
pub mod response;

pub use record::BuildingRecord;
pub use response::{ColumnInfo, RecordListResponse, UploadResponse};
