//! Run statistics
//!
//! Counters collected while the coordinator resolves records, and their console report.

use crate::crawler::{Resolution, ResolutionOutcome};
use std::path::PathBuf;

/// Summary of one harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// List pages fetched
    pub list_pages: usize,

    /// Candidates dropped because they had no usable URL
    pub skipped_candidates: usize,

    /// Records resolved and written
    pub records: usize,

    pub complete: usize,
    pub partial: usize,

    /// Records whose detail page could not be fetched
    pub primary_unavailable: usize,

    /// Deep-link fetches across all records
    pub deep_links_fetched: usize,

    /// Fields filled in by deep links across all records
    pub fields_from_deep_links: usize,

    /// File the records were written to, if any
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    /// Counts one resolved record
    pub fn add(&mut self, resolution: &Resolution) {
        self.records += 1;
        match resolution.outcome {
            ResolutionOutcome::Complete => self.complete += 1,
            ResolutionOutcome::Partial => self.partial += 1,
            ResolutionOutcome::PrimaryUnavailable => self.primary_unavailable += 1,
        }
        self.deep_links_fetched += resolution.deep_links_fetched;
        self.fields_from_deep_links += resolution.fields_from_deep_links;
    }

    /// Share of records that ended complete, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            (self.complete as f64 / self.records as f64) * 100.0
        }
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Pages:");
    println!("  List pages: {}", summary.list_pages);
    println!("  Skipped candidates: {}", summary.skipped_candidates);
    println!();

    println!("Records: {}", summary.records);
    println!("  Complete: {}", summary.complete);
    println!("  Partial: {}", summary.partial);
    println!("  Detail page unavailable: {}", summary.primary_unavailable);
    println!();

    println!("Deep links:");
    println!("  Fetched: {}", summary.deep_links_fetched);
    println!("  Fields filled: {}", summary.fields_from_deep_links);
    println!();

    println!(
        "Completion Rate: {:.1}% ({} / {} records complete)",
        summary.completion_rate(),
        summary.complete,
        summary.records
    );

    match &summary.output_path {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: none (no records)"),
    }
}
