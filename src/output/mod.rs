//! Output module for resolved records and run summaries
//!
//! This module handles:
//! - The sink interface the coordinator writes records through
//! - CSV export, rewritten after every record
//! - Run statistics and their console report

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::{column_order, output_path, write_csv, CsvOutput};
pub use stats::{print_summary, RunSummary};
pub use traits::{MemorySink, OutputError, OutputResult, RecordSink};
