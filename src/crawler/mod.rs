//! Crawler module for list traversal and record resolution
//!
//! This module contains the core harvesting logic, including:
//! - Completeness-driven resolution of one record through its deep links
//! - Overall harvest coordination across paginated list pages

mod coordinator;
mod resolver;

pub use coordinator::Coordinator;
pub use resolver::{select_deep_links, RecordResolver, Resolution, ResolutionOutcome};

use crate::config::Config;
use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::output::{output_path, CsvOutput, RunSummary};
use std::path::Path;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Prepare the output directory and a timestamped CSV file name
/// 2. Walk the list pages and resolve every candidate
/// 3. Rewrite the CSV file after each resolved record
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `fetcher` - Page source for the run
/// * `extractor` - Extraction strategy for the run
///
/// # Returns
///
/// * `Ok(RunSummary)` - Harvest finished; `output_path` is set if any record was written
/// * `Err(HarvestError)` - The output could not be prepared or written
pub async fn harvest(
    config: &Config,
    fetcher: &dyn PageFetcher,
    extractor: &dyn Extractor,
) -> crate::Result<RunSummary> {
    let directory = Path::new(&config.output.directory);
    std::fs::create_dir_all(directory)?;

    let path = output_path(directory, &config.output.file_prefix, &chrono::Local::now());
    tracing::info!("Records will be saved to {}", path.display());

    let mut output = CsvOutput::new(path);
    let mut summary = Coordinator::new(config, fetcher, extractor)
        .run(&mut output)
        .await?;

    if summary.records > 0 {
        summary.output_path = Some(output.path().to_path_buf());
    }

    Ok(summary)
}
