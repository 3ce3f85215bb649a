//! Application state for the building records server

use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::aggregation::Aggregator;
use crate::config::AppConfig;
use crate::table::RecordTable;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Aggregator configured with the ingest limits
    aggregator: Aggregator,
    /// Records from the most recent upload
    table: RwLock<RecordTable>,
    /// Batch that produced the current table
    current_batch: RwLock<Option<Uuid>>,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state with an empty table
    pub fn new(config: AppConfig) -> Self {
        let aggregator = Aggregator::new(config.ingest.clone());
        tracing::info!(
            "Aggregator initialized (max source {} bytes, max depth {})",
            config.ingest.max_source_size,
            config.ingest.max_depth
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                aggregator,
                table: RwLock::new(RecordTable::default()),
                current_batch: RwLock::new(None),
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the aggregator
    pub fn aggregator(&self) -> &Aggregator {
        &self.inner.aggregator
    }

    /// Run `f` against the current table under a read lock
    pub fn with_table<R>(&self, f: impl FnOnce(&RecordTable) -> R) -> R {
        f(&self.inner.table.read())
    }

    /// Replace the session table with the output of a new batch
    pub fn replace_table(&self, batch_id: Uuid, table: RecordTable) {
        tracing::info!("Session table replaced by batch {} ({} records)", batch_id, table.len());
        *self.inner.table.write() = table;
        *self.inner.current_batch.write() = Some(batch_id);
    }

    /// Batch that produced the current table, if any upload happened
    pub fn current_batch(&self) -> Option<Uuid> {
        *self.inner.current_batch.read()
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
