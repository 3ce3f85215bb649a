//! File upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::aggregation::{
    has_extension, BatchOutcome, DiagnosticKind, SourceDiagnostic, SourceFile,
};
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::table::RecordTable;
use crate::types::UploadResponse;

/// Extensions accepted by the upload control
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xml", "zip"];

/// One multipart file, kept in upload order
enum Upload {
    Accepted(SourceFile),
    Rejected(SourceDiagnostic),
}

/// POST /api/upload - Upload XML files or ZIP archives and rebuild the table
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let batch_id = Uuid::new_v4();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::InvalidRequest(format!("Failed to read multipart field: {}", e))
    })? {
        // Non-file form fields carry no data for us
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if !ACCEPTED_EXTENSIONS
            .iter()
            .any(|ext| has_extension(&filename, ext))
        {
            uploads.push(Upload::Rejected(rejection(
                &filename,
                "unsupported file type, expected .xml or .zip",
            )));
            continue;
        }

        match field.bytes().await {
            Ok(data) => uploads.push(Upload::Accepted(SourceFile::new(filename, data))),
            Err(e) => {
                let message = format!("Failed to read file: {}", e);
                uploads.push(Upload::Rejected(rejection(&filename, &message)));
            }
        }
    }

    if uploads.is_empty() {
        return Err(Error::InvalidRequest("No files uploaded".to_string()));
    }

    tracing::info!("Batch {}: processing {} uploaded files", batch_id, uploads.len());

    let aggregator = state.aggregator().clone();
    let mut outcome = tokio::task::spawn_blocking(move || {
        let mut outcome = BatchOutcome::default();
        for upload in uploads {
            match upload {
                Upload::Accepted(source) => aggregator.ingest_source(&source, &mut outcome),
                Upload::Rejected(diagnostic) => {
                    tracing::warn!(
                        "Rejected upload {}: {}",
                        diagnostic.source,
                        diagnostic.message
                    );
                    outcome.sources_processed += 1;
                    outcome.diagnostics.push(diagnostic);
                }
            }
        }
        outcome
    })
    .await
    .map_err(|e| Error::internal(format!("Aggregation task failed: {}", e)))?;

    tracing::info!(
        "Batch {}: {} records from {} files ({} failures)",
        batch_id,
        outcome.records.len(),
        outcome.sources_processed,
        outcome.diagnostics.len()
    );

    let table = RecordTable::new(std::mem::take(&mut outcome.records));
    let processing_time_ms = start.elapsed().as_millis() as u64;
    let response = UploadResponse::new(batch_id, &outcome, &table, processing_time_ms);

    if table.is_empty() {
        tracing::warn!("Batch {}: no valid building records found", batch_id);
    }
    state.replace_table(batch_id, table);

    Ok(Json(response))
}

fn rejection(filename: &str, message: &str) -> SourceDiagnostic {
    SourceDiagnostic {
        source: filename.to_string(),
        entry: None,
        kind: DiagnosticKind::SourceRead,
        message: message.to_string(),
    }
}
