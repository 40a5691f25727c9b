//! Record resolution - the completeness-driven deep-link traversal
//!
//! Given a stub from a list page, the resolver:
//! 1. Fetches the stub's detail page and merges it authoritatively
//! 2. Stops if every required field is known
//! 3. Otherwise follows the extractor's ranked deep links, gap-filling after each one,
//!    until the record is complete or the link budget is spent
//!
//! Every URL is fetched at most once per resolution, comparing URLs without their
//! fragment and with the host lowercased. Failed fetches are skipped, never
//! retried, and never turn into errors: a resolution always yields a record.

use crate::extract::Extractor;
use crate::fetch::PageFetcher;
use crate::record::{FieldName, MergeMode, Record};
use crate::url::{is_absolute_http, visit_key};
use std::collections::HashSet;
use std::time::Duration;

/// How a resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Every required field is known
    Complete,

    /// Sources were exhausted with required fields still unknown
    Partial,

    /// The stub's own page could not be fetched; the stub is returned unchanged
    PrimaryUnavailable,
}

/// Outcome of resolving one stub
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: Record,
    pub outcome: ResolutionOutcome,

    /// Deep-link fetches attempted, successful or not
    pub deep_links_fetched: usize,

    /// Fields filled in by deep links
    pub fields_from_deep_links: usize,
}

impl Resolution {
    fn new(record: Record, outcome: ResolutionOutcome) -> Self {
        Self {
            record,
            outcome,
            deep_links_fetched: 0,
            fields_from_deep_links: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == ResolutionOutcome::Complete
    }
}

/// Resolves stubs into complete (or best-effort) records
pub struct RecordResolver<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn Extractor,
    required: &'a [FieldName],
    max_deep_links: usize,
    link_delay: Duration,
}

impl<'a> RecordResolver<'a> {
    /// Creates a resolver
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Page source for detail pages and deep links
    /// * `extractor` - Detail-page extractor
    /// * `required` - Fields that must be known for a record to be complete
    /// * `max_deep_links` - Maximum deep-link fetches per record
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn Extractor,
        required: &'a [FieldName],
        max_deep_links: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            required,
            max_deep_links,
            link_delay: Duration::ZERO,
        }
    }

    /// Pauses this long after each deep link that was merged without completing the record
    pub fn with_link_delay(mut self, delay: Duration) -> Self {
        self.link_delay = delay;
        self
    }

    /// Resolves one stub
    ///
    /// The stub is consumed and the resolved record handed back inside the `Resolution`.
    pub async fn resolve(&self, stub: Record) -> Resolution {
        let Some(primary_url) = stub.url().map(str::to_string) else {
            tracing::warn!("Stub has no URL, nothing to resolve: {}", stub);
            return Resolution::new(stub, ResolutionOutcome::PrimaryUnavailable);
        };

        let mut visited = HashSet::from([visit_key(&primary_url)]);

        tracing::info!("Resolving: {}", primary_url);
        let Some(page) = self.fetcher.fetch(&primary_url).await else {
            tracing::warn!("Detail page unavailable, keeping stub: {}", primary_url);
            return Resolution::new(stub, ResolutionOutcome::PrimaryUnavailable);
        };

        let mut record = stub;
        let primary = self.extractor.extract_detail(&page).await;
        let changed = record.merge(&primary.fields, MergeMode::Authoritative);
        tracing::debug!("Detail page set {} fields", changed);

        if record.is_complete(self.required) {
            tracing::info!("  -> Complete from the detail page");
            return Resolution::new(record, ResolutionOutcome::Complete);
        }

        let links = select_deep_links(&primary.deep_links, &visited, self.max_deep_links);
        let mut resolution = Resolution::new(record, ResolutionOutcome::Partial);

        for (rank, link) in links.iter().enumerate() {
            visited.insert(visit_key(link));
            resolution.deep_links_fetched += 1;
            tracing::info!("  -> Deep link [{}/{}]: {}", rank + 1, links.len(), link);

            let Some(page) = self.fetcher.fetch(link).await else {
                tracing::debug!("    -> No content, skipping");
                continue;
            };

            let extraction = self.extractor.extract_detail(&page).await;
            let filled = resolution.record.merge(&extraction.fields, MergeMode::GapFill);
            resolution.fields_from_deep_links += filled;
            if filled > 0 {
                tracing::info!("    -> Filled {} fields", filled);
            }

            if resolution.record.is_complete(self.required) {
                tracing::info!("  -> All required fields found, stopping deep links");
                resolution.outcome = ResolutionOutcome::Complete;
                return resolution;
            }

            if !self.link_delay.is_zero() {
                tokio::time::sleep(self.link_delay).await;
            }
        }

        let missing = resolution.record.missing(self.required);
        tracing::info!(
            "  -> Partial record, {} fields unknown: {}",
            missing.len(),
            missing
                .iter()
                .map(FieldName::key)
                .collect::<Vec<_>>()
                .join(", ")
        );

        resolution
    }
}

/// Picks the deep links to follow, in rank order
///
/// Keeps absolute http(s) URLs that are not yet visited, drops repeats within the
/// sequence, and stops at `limit`. `visited` holds `visit_key` forms, and candidates
/// are compared by the same key.
pub fn select_deep_links(
    candidates: &[String],
    visited: &HashSet<String>,
    limit: usize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|candidate| candidate.trim())
        .filter(|candidate| is_absolute_http(candidate))
        .filter(|candidate| {
            let key = visit_key(candidate);
            !visited.contains(&key) && seen.insert(key)
        })
        .take(limit)
        .map(str::to_string)
        .collect()
}
