//! Response types for the HTTP API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregation::{BatchOutcome, SourceDiagnostic};
use crate::table::{RecordTable, TableSummary};

use super::record::BuildingRecord;

/// Response from a file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether any records were extracted
    pub success: bool,
    /// Identifier of this upload batch
    pub batch_id: Uuid,
    /// Files received in the upload
    pub sources_received: usize,
    /// XML documents attempted
    pub documents_processed: usize,
    /// Records now held in the session table
    pub records_added: usize,
    /// Counters for the new table
    pub summary: TableSummary,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Per-file failures (partial success)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<SourceDiagnostic>,
}

impl UploadResponse {
    /// Build from a finished batch and the table made from its records
    pub fn new(
        batch_id: Uuid,
        outcome: &BatchOutcome,
        table: &RecordTable,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            success: !table.is_empty(),
            batch_id,
            sources_received: outcome.sources_processed,
            documents_processed: outcome.documents_processed,
            records_added: table.len(),
            summary: table.summary(),
            processing_time_ms,
            diagnostics: outcome.diagnostics.clone(),
        }
    }
}

/// Response for listing records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    /// Records passing the filter, in table order
    pub records: Vec<BuildingRecord>,
    /// Number of records passing the filter
    pub filtered_count: usize,
    /// Counters over the whole, unfiltered table
    pub summary: TableSummary,
}

/// Description of one export column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnInfo {
    /// Every column in export order
    pub fn all() -> Vec<ColumnInfo> {
        BuildingRecord::FIELD_NAMES
            .iter()
            .map(|name| ColumnInfo {
                name: name.to_string(),
                description: BuildingRecord::column_description(name).map(str::to_string),
            })
            .collect()
    }
}
