//! Crawler coordinator - main harvest orchestration logic
//!
//! This module walks the portal's list pages and drives record resolution:
//! - Fetching and analysing each list page
//! - Following the pagination control while still on the list page
//! - Resolving every candidate through the deep-link resolver
//! - Writing each record to the sink as soon as it is resolved

use crate::config::Config;
use crate::crawler::resolver::RecordResolver;
use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::output::{RecordSink, RunSummary};
use crate::record::FieldName;
use crate::url::is_absolute_http;
use std::time::Duration;

/// Main harvest coordinator
pub struct Coordinator<'a> {
    config: &'a Config,
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn Extractor,
}

impl<'a> Coordinator<'a> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `fetcher` - Page source shared by list pages, detail pages and deep links
    /// * `extractor` - Extraction strategy for list and detail pages
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn Extractor,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
        }
    }

    /// Runs the main harvest loop
    ///
    /// This is the core logic that:
    /// 1. Fetches a list page and extracts candidate stubs
    /// 2. Activates the next-page control, remembering where it leads
    /// 3. Resolves each candidate and appends it to the sink
    /// 4. Moves to the next list page until the page or record limit is reached
    ///
    /// Failures inside one record never abort the run. Only sink errors do.
    pub async fn run(&self, sink: &mut dyn RecordSink) -> crate::Result<RunSummary> {
        let crawler = &self.config.crawler;
        let max_pages = crawler.max_pages as usize;
        let max_records = crawler.max_records as usize;
        let required: &[FieldName] = &crawler.required_fields;

        let resolver = RecordResolver::new(
            self.fetcher,
            self.extractor,
            required,
            crawler.max_deep_links as usize,
        )
        .with_link_delay(Duration::from_millis(crawler.deep_link_delay_ms));

        let mut summary = RunSummary::default();
        let mut current_url = crawler.target_url.clone();

        'pages: for page_number in 1..=max_pages {
            tracing::info!("=== List page {}/{}: {} ===", page_number, max_pages, current_url);

            let Some(list_page) = self.fetcher.fetch_listing(&current_url).await else {
                tracing::warn!("List page unavailable, stopping pagination: {}", current_url);
                break;
            };
            summary.list_pages += 1;

            let analysis = self.extractor.analyze_list(&list_page).await;
            if analysis.candidates.is_empty() {
                tracing::warn!("No candidates found on {}", list_page.url);
            } else {
                tracing::info!("Found {} candidates", analysis.candidates.len());
            }

            // Detail-page navigation leaves the list page, so paginate first
            let next_url = match &analysis.next_page_selector {
                Some(selector) if page_number < max_pages => {
                    self.next_list_url(selector, &list_page.url).await
                }
                _ => None,
            };

            for candidate in analysis.candidates {
                if summary.records >= max_records {
                    tracing::info!("Reached max records ({}), stopping", max_records);
                    break 'pages;
                }

                match candidate.url() {
                    Some(url) if is_absolute_http(url) => {}
                    other => {
                        tracing::warn!(
                            "Skipping candidate '{}': invalid URL {:?}",
                            candidate.title().unwrap_or("?"),
                            other
                        );
                        summary.skipped_candidates += 1;
                        continue;
                    }
                }

                tracing::info!("[{}/{}] {}", summary.records + 1, max_records, candidate);
                let resolution = resolver.resolve(candidate).await;
                summary.add(&resolution);
                sink.append(resolution.record)?;
            }

            match next_url {
                Some(url) => current_url = url,
                None => {
                    tracing::info!("No further list pages");
                    break;
                }
            }
        }

        tracing::info!(
            "Harvest finished: {} records ({} complete) from {} list pages",
            summary.records,
            summary.complete,
            summary.list_pages
        );

        Ok(summary)
    }

    /// Activates the pagination control and reports the resulting URL
    ///
    /// Returns None when the control is missing or the URL did not change.
    async fn next_list_url(&self, selector: &str, list_url: &str) -> Option<String> {
        tracing::info!("Moving to next page ({})", selector);
        if !self.fetcher.follow(selector).await {
            tracing::info!("Pagination control not found, this is the last page");
            return None;
        }

        match self.fetcher.current_url().await {
            Some(url) if url != list_url => Some(url),
            _ => {
                tracing::warn!("Pagination did not change the URL, stopping after this page");
                None
            }
        }
    }
}
