//! Building records server binary
//!
//! Run with: cargo run -p building-records --bin building-records-server

use building_records::{config::AppConfig, server::RecordServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "building_records=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Max upload size: {} bytes", config.server.max_upload_size);
    tracing::info!("  - Max source size: {} bytes", config.ingest.max_source_size);
    tracing::info!("  - Max archive entries: {}", config.ingest.max_archive_entries);
    tracing::info!("  - Export prefix: {}", config.export.filename_prefix);

    let server = RecordServer::new(config);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload   - Upload XML files or ZIP archives");
    println!("  GET  /api/records  - Review records (?senders=A,B)");
    println!("  GET  /api/export   - Download CSV (?senders=A,B)");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
