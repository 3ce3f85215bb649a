//! Batch aggregation of uploaded files into one record sequence

mod aggregator;
mod source;

pub use aggregator::{aggregate, decode_text, Aggregator, BatchOutcome};
pub use source::{has_extension, DiagnosticKind, SourceDiagnostic, SourceFile, SourceKind};
