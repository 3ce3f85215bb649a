//! In-memory record table with summary counters and sender filtering

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::BuildingRecord;

/// The aggregated records of one session
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    records: Vec<BuildingRecord>,
}

/// Smallest and largest completion date present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: String,
    pub max: String,
}

/// Headline counters shown above the table
///
/// Distinct counts treat an empty string as a value, so records without
/// contact details add one "installer" between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub total_records: usize,
    pub unique_senders: usize,
    pub unique_installers: usize,
    /// `None` when no record has a completion date
    pub date_range: Option<DateRange>,
}

/// Selected sender codes; an empty selection keeps every record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderFilter {
    senders: BTreeSet<String>,
}

impl SenderFilter {
    pub fn new<I, S>(senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            senders: senders.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"CERTAS,HETAS"`
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn matches(&self, record: &BuildingRecord) -> bool {
        self.senders.is_empty() || self.senders.contains(&record.sender_code)
    }
}

impl RecordTable {
    pub fn new(records: Vec<BuildingRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BuildingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute the headline counters
    pub fn summary(&self) -> TableSummary {
        let unique_senders = self
            .records
            .iter()
            .map(|r| r.sender_code.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let unique_installers = self
            .records
            .iter()
            .map(|r| r.installer_registered_name.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let mut dates = self
            .records
            .iter()
            .map(|r| r.date_work_completed.as_str())
            .filter(|d| !d.is_empty());
        let date_range = dates.next().map(|first| {
            let (min, max) = dates.fold((first, first), |(min, max), d| {
                (min.min(d), max.max(d))
            });
            DateRange {
                min: min.to_string(),
                max: max.to_string(),
            }
        });

        TableSummary {
            total_records: self.records.len(),
            unique_senders,
            unique_installers,
            date_range,
        }
    }

    /// Distinct sender codes, sorted
    pub fn sender_codes(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.sender_code.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Read-only view of the records matching `filter`, in table order
    pub fn filter(&self, filter: &SenderFilter) -> Vec<&BuildingRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

impl From<Vec<BuildingRecord>> for RecordTable {
    fn from(records: Vec<BuildingRecord>) -> Self {
        Self::new(records)
    }
}
