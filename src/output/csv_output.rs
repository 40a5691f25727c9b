//! CSV output
//!
//! The file is UTF-8 with a byte-order mark so spreadsheet tools detect the encoding.
//! Columns come in a fixed order: the priority fields first, then every other field in
//! canonical order. Unknown values are written as `unknown`.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::{FieldName, Record};
use chrono::{DateTime, TimeZone};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column order of the CSV file
pub fn column_order() -> Vec<FieldName> {
    let mut columns = FieldName::PRIORITY.to_vec();
    columns.extend(
        FieldName::ALL
            .iter()
            .copied()
            .filter(|field| !FieldName::PRIORITY.contains(field)),
    );
    columns
}

/// Builds `{directory}/{prefix}_{YYYYmmdd_HHMMSS}.csv`
pub fn output_path<Tz: TimeZone>(directory: &Path, prefix: &str, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    directory.join(format!("{}_{}.csv", prefix, at.format("%Y%m%d_%H%M%S")))
}

/// Writes every record to `path`, replacing any existing file
///
/// The data goes to a sibling temporary file first and is renamed into place, so a
/// reader never sees a half-written file.
pub fn write_csv(path: &Path, records: &[Record]) -> OutputResult<()> {
    let temp_path = path.with_extension("csv.tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(UTF8_BOM)?;

        let columns = column_order();
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(columns.iter().map(FieldName::key))?;
        for record in records {
            writer.write_record(columns.iter().map(|field| record.display_value(*field)))?;
        }
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Sink that rewrites a CSV file after every record
pub struct CsvOutput {
    path: PathBuf,
    records: Vec<Record>,
}

impl CsvOutput {
    /// Creates a sink writing to `path`; nothing is written until the first record
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvOutput {
    fn append(&mut self, record: Record) -> OutputResult<()> {
        self.records.push(record);
        write_csv(&self.path, &self.records)?;
        tracing::debug!(
            "Saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn records(&self) -> &[Record] {
        &self.records
    }
}
