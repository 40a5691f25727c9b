//! Heuristic HTML extraction
//!
//! Used when the model is unavailable or answers with nothing. It recognises detail-page
//! links on list pages and a heading plus summary text on detail pages. It never
//! proposes deep links or pagination.

use crate::extract::clean::truncate_chars;
use crate::extract::{DetailExtraction, Extractor, ListAnalysis};
use crate::fetch::{ContentKind, PageContent};
use crate::record::{FieldName, Record};
use crate::url::resolve_link;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Titles shorter than this are replaced by the surrounding element's text
const MIN_TITLE_CHARS: usize = 5;

const MAX_TITLE_CHARS: usize = 200;

/// Broad-scan links must be longer than this to count as candidates
const MIN_BROAD_URL_CHARS: usize = 20;

/// Paragraphs shorter than this are treated as boilerplate
const MIN_PARAGRAPH_CHARS: usize = 50;

const MAX_SUMMARY_CHARS: usize = 500;
const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Extracts records by scanning HTML structure
pub struct HeuristicExtractor {
    detail_url_pattern: String,
    max_candidates: usize,
}

impl HeuristicExtractor {
    /// Creates a heuristic extractor
    ///
    /// # Arguments
    ///
    /// * `detail_url_pattern` - Substring that identifies detail-page links
    /// * `max_candidates` - Cap on stubs returned for one list page
    pub fn new(detail_url_pattern: impl Into<String>, max_candidates: usize) -> Self {
        Self {
            detail_url_pattern: detail_url_pattern.into(),
            max_candidates,
        }
    }

    /// Scans a list page for detail-page links
    pub fn scan_list(&self, page: &PageContent) -> ListAnalysis {
        if page.kind == ContentKind::Document {
            return ListAnalysis::default();
        }
        let Ok(base_url) = Url::parse(&page.url) else {
            return ListAnalysis::default();
        };
        let Ok(anchor) = Selector::parse("a[href]") else {
            return ListAnalysis::default();
        };

        let document = Html::parse_document(&page.body);
        let anchors: Vec<ElementRef<'_>> = document.select(&anchor).collect();
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for link in &anchors {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.detail_url_pattern) {
                continue;
            }
            let Some(url) = resolve_link(href, &base_url) else {
                continue;
            };
            if !seen.insert(url.clone()) {
                continue;
            }

            let mut title = element_text(link);
            if title.chars().count() < MIN_TITLE_CHARS {
                if let Some(parent) = link.parent().and_then(ElementRef::wrap) {
                    title = element_text(&parent);
                }
            }
            if title.chars().count() < MIN_TITLE_CHARS {
                title = "No Title Found".to_string();
            }

            candidates.push(Record::stub(&url, &truncate_chars(&title, MAX_TITLE_CHARS)));
        }

        if candidates.is_empty() {
            // Nothing matched the portal's pattern; take any substantial absolute link
            for link in &anchors {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                if !href.starts_with("http") || href.len() <= MIN_BROAD_URL_CHARS {
                    continue;
                }
                if !seen.insert(href.to_string()) {
                    continue;
                }

                let text = element_text(link);
                let title = if text.is_empty() {
                    "Unknown Title".to_string()
                } else {
                    truncate_chars(&text, MAX_TITLE_CHARS)
                };
                candidates.push(Record::stub(href, &title));
            }
        }

        candidates.truncate(self.max_candidates);
        tracing::debug!(
            "Heuristic scan found {} candidates on {}",
            candidates.len(),
            page.url
        );

        ListAnalysis {
            candidates,
            next_page_selector: None,
        }
    }

    /// Pulls a title and summary out of a detail page
    ///
    /// Document text has no headings or meta tags to scan.
    pub fn scan_detail(&self, page: &PageContent) -> DetailExtraction {
        if page.kind == ContentKind::Document {
            return DetailExtraction::default();
        }
        let document = Html::parse_document(&page.body);
        let mut fields = Record::new();

        if let Some(heading) = first_match(&document, "h1") {
            fields.set(FieldName::Title, &element_text(&heading));
        }

        let mut summary = first_match(&document, r#"meta[name="description"]"#)
            .and_then(|meta| meta.value().attr("content").map(str::trim))
            .unwrap_or_default()
            .to_string();

        if summary.is_empty() {
            if let Ok(paragraph) = Selector::parse("p") {
                let texts: Vec<String> = document
                    .select(&paragraph)
                    .take(3)
                    .map(|p| element_text(&p))
                    .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
                    .collect();
                summary = texts.join(" ");
            }
        }

        if !summary.is_empty() {
            fields.set(FieldName::Summary, &truncate_chars(&summary, MAX_SUMMARY_CHARS));
            fields.set(
                FieldName::Description,
                &truncate_chars(&summary, MAX_DESCRIPTION_CHARS),
            );
        }

        DetailExtraction {
            fields,
            deep_links: Vec::new(),
        }
    }
}

#[async_trait]
impl Extractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn analyze_list(&self, page: &PageContent) -> ListAnalysis {
        self.scan_list(page)
    }

    async fn extract_detail(&self, page: &PageContent) -> DetailExtraction {
        self.scan_detail(page)
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Text content of an element with whitespace collapsed
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
