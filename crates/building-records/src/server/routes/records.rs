//! Table review and export endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::export;
use crate::server::state::AppState;
use crate::table::{SenderFilter, TableSummary};
use crate::types::{ColumnInfo, RecordListResponse};

/// Query parameters shared by listing and export
#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    /// Comma-separated sender codes; absent or empty keeps every record
    #[serde(default)]
    pub senders: Option<String>,
}

impl RecordsQuery {
    fn filter(&self) -> SenderFilter {
        self.senders
            .as_deref()
            .map(SenderFilter::parse)
            .unwrap_or_default()
    }
}

/// GET /api/records - List records, optionally filtered by sender
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordsQuery>,
) -> Json<RecordListResponse> {
    let filter = params.filter();

    let response = state.with_table(|table| {
        let records: Vec<_> = table.filter(&filter).into_iter().cloned().collect();
        RecordListResponse {
            filtered_count: records.len(),
            records,
            summary: table.summary(),
        }
    });

    Json(response)
}

/// GET /api/summary - Headline counters for the whole table
pub async fn get_summary(State(state): State<AppState>) -> Json<TableSummary> {
    Json(state.with_table(|table| table.summary()))
}

/// GET /api/senders - Sender codes available to the filter
pub async fn list_senders(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.with_table(|table| table.sender_codes()))
}

/// GET /api/columns - Export columns with descriptions
pub async fn list_columns() -> Json<Vec<ColumnInfo>> {
    Json(ColumnInfo::all())
}

/// GET /api/export - Download the (filtered) table as CSV
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<RecordsQuery>,
) -> Result<Response> {
    let filter = params.filter();
    let (body, row_count) = state.with_table(|table| {
        let rows = table.filter(&filter);
        let count = rows.len();
        export::to_csv_bytes(rows).map(|body| (body, count))
    })?;

    let export_config = &state.config().export;
    let filename = export::export_filename(
        &export_config.filename_prefix,
        &export_config.timestamp_format,
        &chrono::Local::now(),
    );

    tracing::info!("Exporting {} records as {}", row_count, filename);

    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("{}; charset=utf-8", export::CSV_CONTENT_TYPE),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
