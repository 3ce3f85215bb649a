//! building-records: Building Record XML filings flattened into a reviewable table
//!
//! Uploaded XML documents (or ZIP archives of them) are parsed, every
//! `BuildingRecord` element is flattened into a fixed-column row tagged with
//! its source file, and the aggregated table can be summarised, filtered by
//! sender and exported as CSV.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod server;
pub mod table;
pub mod types;

pub use aggregation::{aggregate, Aggregator, BatchOutcome, SourceDiagnostic, SourceFile};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use extraction::{extract, Extractor};
pub use table::{RecordTable, SenderFilter, TableSummary};
pub use types::BuildingRecord;
