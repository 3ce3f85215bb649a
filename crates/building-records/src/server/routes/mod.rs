//! API routes for the building records server

pub mod records;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for file uploads
        .route(
            "/upload",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Table review
        .route("/records", get(records::list_records))
        .route("/summary", get(records::get_summary))
        .route("/senders", get(records::list_senders))
        .route("/columns", get(records::list_columns))
        // Download
        .route("/export", get(records::export_csv))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "building-records",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Building Record XML filings flattened into a reviewable, exportable table",
        "endpoints": {
            "POST /api/upload": "Upload XML files or ZIP archives (replaces the current table)",
            "GET /api/records": "List records (?senders=A,B to filter)",
            "GET /api/summary": "Record, sender and installer counts and completion date range",
            "GET /api/senders": "Sender codes available for filtering",
            "GET /api/columns": "Export columns with descriptions",
            "GET /api/export": "Download records as CSV (?senders=A,B to filter)"
        }
    }))
}
