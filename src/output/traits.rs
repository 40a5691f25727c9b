//! Output sink trait and errors
//!
//! This module defines the interface the coordinator writes resolved records through.

use crate::record::Record;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for resolved records
///
/// Records arrive one at a time, in resolution order. A sink must have persisted
/// everything it was given by the time `append` returns, so an interrupted run keeps
/// every record resolved so far.
pub trait RecordSink: Send {
    /// Appends one resolved record
    fn append(&mut self, record: Record) -> OutputResult<()>;

    /// Records appended so far
    fn records(&self) -> &[Record];
}

/// Sink that keeps records in memory only
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Record>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: Record) -> OutputResult<()> {
        self.records.push(record);
        Ok(())
    }

    fn records(&self) -> &[Record] {
        &self.records
    }
}
