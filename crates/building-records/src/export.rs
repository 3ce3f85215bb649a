//! CSV export of building records

use chrono::{DateTime, TimeZone};
use std::io::Write;

use crate::error::Result;
use crate::types::BuildingRecord;

/// MIME type of the export
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Write a header row and one row per record
///
/// The header is written even when there are no records. A missing UPRN is
/// an empty cell.
pub fn write_csv<'a, W, I>(records: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a BuildingRecord>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(BuildingRecord::FIELD_NAMES)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Render records to an in-memory CSV document
pub fn to_csv_bytes<'a, I>(records: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a BuildingRecord>,
{
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(buffer)
}

/// Download name such as `building_records_20240131_142501.csv`
pub fn export_filename<Tz>(prefix: &str, timestamp_format: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.csv", prefix, at.format(timestamp_format))
}
