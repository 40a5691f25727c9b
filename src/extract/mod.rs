//! Structured extraction from fetched pages
//!
//! This module turns page content into records. It contains:
//! - The `Extractor` contract shared by every strategy
//! - `ModelExtractor`: prompts a language model and parses its JSON answer
//! - `HeuristicExtractor`: scans the HTML for links, headings and paragraphs
//! - `FallbackExtractor`: runs one strategy and substitutes another when the first
//!   produces nothing usable
//!
//! Extraction never fails outright. A strategy that cannot produce anything returns an
//! empty result, and callers treat that as "no new information".

mod clean;
mod gemini;
mod heuristic;
mod model;
mod prompt;

pub use clean::clean_for_model;
pub use gemini::GeminiClient;
pub use heuristic::HeuristicExtractor;
pub use model::{parse_detail_response, parse_list_response, ModelExtractor};

use crate::config::ExtractorConfig;
use crate::fetch::PageContent;
use crate::record::Record;
use async_trait::async_trait;

/// Result of analysing a list page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAnalysis {
    /// Candidate stubs in page order
    pub candidates: Vec<Record>,

    /// CSS selector of the control leading to the next list page
    pub next_page_selector: Option<String>,
}

impl ListAnalysis {
    /// A list analysis is usable iff it found at least one candidate
    pub fn is_usable(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// Result of extracting a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailExtraction {
    /// Field values found on the page; unknown fields stay unset
    pub fields: Record,

    /// Follow-up URLs likely to hold missing information, best first
    pub deep_links: Vec<String>,
}

impl DetailExtraction {
    /// A detail extraction is usable iff it found any value or any deep link
    pub fn is_usable(&self) -> bool {
        !self.fields.is_empty() || !self.deep_links.is_empty()
    }
}

/// Extracts records from page content
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Finds candidate records and the pagination control on a list page
    async fn analyze_list(&self, page: &PageContent) -> ListAnalysis;

    /// Extracts field values and ranked follow-up links from a detail page
    async fn extract_detail(&self, page: &PageContent) -> DetailExtraction;
}

/// Runs a primary extractor and substitutes a fallback for unusable results
pub struct FallbackExtractor<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackExtractor<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: Extractor, F: Extractor> Extractor for FallbackExtractor<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn analyze_list(&self, page: &PageContent) -> ListAnalysis {
        let analysis = self.primary.analyze_list(page).await;
        if analysis.is_usable() {
            return analysis;
        }

        tracing::info!(
            "{} found no candidates on {}, using {} extraction",
            self.primary.name(),
            page.url,
            self.fallback.name()
        );
        self.fallback.analyze_list(page).await
    }

    async fn extract_detail(&self, page: &PageContent) -> DetailExtraction {
        let extraction = self.primary.extract_detail(page).await;
        if extraction.is_usable() {
            return extraction;
        }

        tracing::info!(
            "{} extracted nothing from {}, using {} extraction",
            self.primary.name(),
            page.url,
            self.fallback.name()
        );
        self.fallback.extract_detail(page).await
    }
}

/// Builds the standard model-then-heuristic extractor from configuration
///
/// The API key is read from the environment variable named in the configuration. When it
/// is not set the model is skipped and every page goes straight to the heuristics.
pub fn build_extractor(
    config: &ExtractorConfig,
    max_deep_links: usize,
) -> FallbackExtractor<ModelExtractor, HeuristicExtractor> {
    let client = match GeminiClient::from_config(config) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("{}; model extraction disabled", e);
            None
        }
    };

    let model = ModelExtractor::new(client, config.max_input_chars, max_deep_links);
    let heuristic = HeuristicExtractor::new(
        config.detail_url_pattern.clone(),
        config.heuristic_max_candidates,
    );

    FallbackExtractor::new(model, heuristic)
}
