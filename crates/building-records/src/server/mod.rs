//! HTTP server for uploading, reviewing and exporting building records

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Building records HTTP server
pub struct RecordServer {
    config: AppConfig,
    state: AppState,
}

impl RecordServer {
    /// Create a new server
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::new(config.clone());
        Self { config, state }
    }

    /// Shared state handed to every handler
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            // Health check
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            // API routes with body limit for multipart uploads
            .nest("/api", routes::api_routes(self.config.server.max_upload_size))
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting building records server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::table::{RecordTable, TableSummary};
    use crate::types::{BuildingRecord, RecordListResponse, UploadResponse};

    const BOUNDARY: &str = "X-BUILDING-RECORDS-BOUNDARY";

    fn multipart_body(files: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, content) in files {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n{}\r\n",
                BOUNDARY, name, content
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn upload_request(files: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    fn record(sender: &str, source: &str) -> BuildingRecord {
        BuildingRecord {
            sender_code: sender.to_string(),
            source_file: source.to_string(),
            ..Default::default()
        }
    }

    const FILING: &str = "<BuildingRecords><GlobalDetails><SenderCode>CERTAS</SenderCode></GlobalDetails><BuildingRecord/><BuildingRecord/></BuildingRecords>";

    #[tokio::test]
    async fn test_health() {
        let server = RecordServer::new(AppConfig::default());
        let response = server.router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"OK");
    }

    #[tokio::test]
    async fn test_readiness_follows_state() {
        let server = RecordServer::new(AppConfig::default());
        let response = server.router().oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        server.state().set_ready(false);
        let response = server.router().oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_upload_replaces_table_and_reports_failures() {
        let server = RecordServer::new(AppConfig::default());
        let request = upload_request(&[
            ("filing.xml", FILING),
            ("broken.xml", "<BuildingRecords>"),
            ("notes.txt", "hello"),
        ]);

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let upload: UploadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(upload.success);
        assert_eq!(upload.records_added, 2);
        assert_eq!(upload.sources_received, 3);
        assert_eq!(upload.diagnostics.len(), 2);
        assert_eq!(upload.summary.unique_senders, 1);

        assert_eq!(server.state().with_table(|t| t.len()), 2);
        assert_eq!(server.state().current_batch(), Some(upload.batch_id));
    }

    #[tokio::test]
    async fn test_upload_diagnostics_follow_upload_order() {
        let server = RecordServer::new(AppConfig::default());
        let request = upload_request(&[
            ("notes.txt", "hello"),
            ("broken.xml", "<BuildingRecords>"),
            ("filing.xml", FILING),
            ("image.png", "png"),
        ]);

        let response = server.router().oneshot(request).await.unwrap();
        let upload: UploadResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let sources: Vec<&str> = upload.diagnostics.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["notes.txt", "broken.xml", "image.png"]);
        assert_eq!(upload.sources_received, 4);
        assert_eq!(upload.records_added, 2);
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let server = RecordServer::new(AppConfig::default());
        let response = server.router().oneshot(upload_request(&[])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_filtered_listing() {
        let server = RecordServer::new(AppConfig::default());
        server.state().replace_table(
            uuid::Uuid::new_v4(),
            RecordTable::new(vec![
                record("HETAS", "a.xml"),
                record("CERTAS", "b.xml"),
                record("HETAS", "c.xml"),
            ]),
        );

        let response = server
            .router()
            .oneshot(get("/api/records?senders=HETAS"))
            .await
            .unwrap();
        let listing: RecordListResponse =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(listing.filtered_count, 2);
        assert_eq!(listing.summary.total_records, 3);

        let response = server.router().oneshot(get("/api/senders")).await.unwrap();
        let senders: Vec<String> = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(senders, vec!["CERTAS", "HETAS"]);

        let response = server.router().oneshot(get("/api/summary")).await.unwrap();
        let summary: TableSummary = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(summary.unique_senders, 2);
    }

    #[tokio::test]
    async fn test_export_download() {
        let server = RecordServer::new(AppConfig::default());
        server.state().replace_table(
            uuid::Uuid::new_v4(),
            RecordTable::new(vec![record("HETAS", "a.xml"), record("CERTAS", "b.xml")]),
        );

        let response = server
            .router()
            .oneshot(get("/api/export?senders=CERTAS"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"building_records_"));
        assert!(disposition.ends_with(".csv\""));

        let csv = String::from_utf8(body_bytes(response).await).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("sender_code,"));
        assert!(lines[1].starts_with("CERTAS,"));
        assert!(lines[1].ends_with(",b.xml"));
    }
}
