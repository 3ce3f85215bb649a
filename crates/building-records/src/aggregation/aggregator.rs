//! Batch aggregation over plain XML files and ZIP archives

use std::io::{Cursor, Read};

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::extraction::Extractor;
use crate::types::BuildingRecord;

use super::source::{has_extension, SourceDiagnostic, SourceFile, SourceKind};

/// Everything collected from one batch of sources
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Records in source order, then document order
    pub records: Vec<BuildingRecord>,
    /// One entry per failing source, archive entry or document
    pub diagnostics: Vec<SourceDiagnostic>,
    /// Sources handed to the aggregator
    pub sources_processed: usize,
    /// XML documents attempted, including failed ones
    pub documents_processed: usize,
}

impl BatchOutcome {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Runs the extractor over every document of a batch
///
/// A failing source never aborts the batch: it is recorded as a diagnostic
/// and contributes no records.
#[derive(Debug, Clone)]
pub struct Aggregator {
    extractor: Extractor,
    limits: IngestConfig,
}

impl Aggregator {
    pub fn new(limits: IngestConfig) -> Self {
        Self {
            extractor: Extractor::new(limits.max_depth),
            limits,
        }
    }

    /// Aggregate all sources in input order
    pub fn aggregate(&self, sources: &[SourceFile]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for source in sources {
            self.ingest_source(source, &mut outcome);
        }

        tracing::info!(
            "Aggregated {} records from {} sources ({} documents, {} failures)",
            outcome.records.len(),
            outcome.sources_processed,
            outcome.documents_processed,
            outcome.diagnostics.len()
        );

        outcome
    }

    /// Read one source and append its records to `outcome`
    pub fn ingest_source(&self, source: &SourceFile, outcome: &mut BatchOutcome) {
        outcome.sources_processed += 1;
        tracing::info!("Processing file: {} ({} bytes)", source.name, source.data.len());

        if source.data.len() as u64 > self.limits.max_source_size {
            let error = Error::source_read(
                &source.name,
                format!(
                    "file is {} bytes, limit is {}",
                    source.data.len(),
                    self.limits.max_source_size
                ),
            );
            record_failure(outcome, &source.name, None, error);
            return;
        }

        match source.kind() {
            SourceKind::Archive => self.ingest_archive(source, outcome),
            SourceKind::Document => {
                self.ingest_document(&source.name, None, &source.data, outcome)
            }
        }
    }

    fn ingest_archive(&self, source: &SourceFile, outcome: &mut BatchOutcome) {
        let mut archive = match zip::ZipArchive::new(Cursor::new(source.data.clone())) {
            Ok(archive) => archive,
            Err(e) => {
                record_failure(
                    outcome,
                    &source.name,
                    None,
                    Error::source_read(&source.name, e.to_string()),
                );
                return;
            }
        };

        if archive.len() > self.limits.max_archive_entries {
            let error = Error::source_read(
                &source.name,
                format!(
                    "archive has {} entries, limit is {}",
                    archive.len(),
                    self.limits.max_archive_entries
                ),
            );
            record_failure(outcome, &source.name, None, error);
            return;
        }

        for index in 0..archive.len() {
            let (entry_name, data) = {
                let mut file = match archive.by_index(index) {
                    Ok(file) => file,
                    Err(e) => {
                        let entry = format!("entry #{}", index);
                        let error = Error::source_read(&entry, e.to_string());
                        record_failure(outcome, &source.name, Some(&entry), error);
                        continue;
                    }
                };

                let name = file.name().to_string();
                if file.is_dir() || !has_extension(&name, "xml") {
                    tracing::debug!("Skipping archive entry {} in {}", name, source.name);
                    continue;
                }

                match read_entry(&mut file, &name, self.limits.max_entry_size) {
                    Ok(data) => (name, data),
                    Err(error) => {
                        record_failure(outcome, &source.name, Some(&name), error);
                        continue;
                    }
                }
            };

            tracing::debug!("Extracting {} from {}", entry_name, source.name);
            self.ingest_document(&source.name, Some(&entry_name), &data, outcome);
        }
    }

    fn ingest_document(
        &self,
        source: &str,
        entry: Option<&str>,
        data: &[u8],
        outcome: &mut BatchOutcome,
    ) {
        let document_name = entry.unwrap_or(source);
        outcome.documents_processed += 1;

        let extracted = decode_text(document_name, data)
            .and_then(|text| self.extractor.extract(text));

        match extracted {
            Ok(mut records) => {
                for record in records.iter_mut() {
                    record.source_file = document_name.to_string();
                }
                tracing::debug!("Extracted {} records from {}", records.len(), document_name);
                outcome.records.extend(records);
            }
            Err(error) => record_failure(outcome, source, entry, error),
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

/// Aggregate with default limits
pub fn aggregate(sources: &[SourceFile]) -> BatchOutcome {
    Aggregator::default().aggregate(sources)
}

/// Decode document bytes as strict UTF-8, dropping a leading byte-order mark
pub fn decode_text<'a>(name: &str, data: &'a [u8]) -> Result<&'a str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    std::str::from_utf8(data).map_err(|e| Error::source_read(name, format!("invalid UTF-8: {}", e)))
}

fn read_entry(file: &mut impl Read, name: &str, max_size: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    file.take(max_size + 1)
        .read_to_end(&mut data)
        .map_err(|e| Error::source_read(name, e.to_string()))?;

    if data.len() as u64 > max_size {
        return Err(Error::source_read(
            name,
            format!("entry exceeds {} bytes", max_size),
        ));
    }
    Ok(data)
}

fn record_failure(outcome: &mut BatchOutcome, source: &str, entry: Option<&str>, error: Error) {
    match entry {
        Some(entry) => tracing::warn!("Failed to process {} in {}: {}", entry, source, error),
        None => tracing::warn!("Failed to process {}: {}", source, error),
    }
    outcome
        .diagnostics
        .push(SourceDiagnostic::from_error(source, entry, &error));
}
