//! Named byte sources and per-source diagnostics

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An uploaded file: its name and raw bytes
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// How the source will be read, based on its name
    pub fn kind(&self) -> SourceKind {
        SourceKind::from_name(&self.name)
    }
}

/// Container format of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// ZIP archive of XML documents
    Archive,
    /// A single XML document
    Document,
}

impl SourceKind {
    /// Anything not ending in `.zip` is read as a document
    pub fn from_name(name: &str) -> Self {
        if has_extension(name, "zip") {
            SourceKind::Archive
        } else {
            SourceKind::Document
        }
    }
}

/// ASCII case-insensitive check for a `.ext` suffix
pub fn has_extension(name: &str, extension: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Category of a per-source failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Document is not well-formed XML
    Parse,
    /// Failure while traversing a well-formed document
    Extraction,
    /// File or archive entry could not be opened or decoded
    SourceRead,
}

/// A failure recorded for one source or archive entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDiagnostic {
    /// Uploaded file name
    pub source: String,
    /// Archive entry name, when the failure is inside an archive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl SourceDiagnostic {
    /// Build a diagnostic from an extraction or read error
    pub fn from_error(source: &str, entry: Option<&str>, error: &Error) -> Self {
        let kind = match error {
            Error::Parse(_) => DiagnosticKind::Parse,
            Error::SourceRead { .. } | Error::Io(_) => DiagnosticKind::SourceRead,
            _ => DiagnosticKind::Extraction,
        };

        Self {
            source: source.to_string(),
            entry: entry.map(str::to_string),
            kind,
            message: error.to_string(),
        }
    }

    /// Name of the failing document, entry if present
    pub fn document_name(&self) -> &str {
        self.entry.as_deref().unwrap_or(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(SourceKind::from_name("batch.zip"), SourceKind::Archive);
        assert_eq!(SourceKind::from_name("BATCH.ZIP"), SourceKind::Archive);
        assert_eq!(SourceKind::from_name("filing.xml"), SourceKind::Document);
        assert_eq!(SourceKind::from_name("zip"), SourceKind::Document);
        assert_eq!(SourceKind::from_name("notes.txt"), SourceKind::Document);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension("a/b/filing.XML", "xml"));
        assert!(!has_extension("filing.xml.bak", "xml"));
        assert!(!has_extension("xml", "xml"));
    }

    #[test]
    fn test_diagnostic_kind_from_error() {
        let parse = SourceDiagnostic::from_error("a.xml", None, &Error::parse("bad"));
        assert_eq!(parse.kind, DiagnosticKind::Parse);
        assert_eq!(parse.document_name(), "a.xml");

        let read = SourceDiagnostic::from_error(
            "b.zip",
            Some("inner.xml"),
            &Error::source_read("inner.xml", "invalid utf-8"),
        );
        assert_eq!(read.kind, DiagnosticKind::SourceRead);
        assert_eq!(read.document_name(), "inner.xml");

        let other = SourceDiagnostic::from_error("c.xml", None, &Error::extraction("too deep"));
        assert_eq!(other.kind, DiagnosticKind::Extraction);
    }
}
