//! Page fetching for list pages, detail pages and linked documents
//!
//! This module contains the fetcher contract the resolver and coordinator depend on, and
//! its two implementations:
//! - `BrowserSession`: a headless Chrome session for client-rendered portals
//! - `HttpFetcher`: a plain HTTP client for static pages
//!
//! Both turn PDF documents into their extracted text, so callers never see raw bytes.
//! A failed fetch is reported as `None`, never as an error.

mod browser;
mod http;
mod pdf;

pub use browser::BrowserSession;
pub use http::{build_http_client, HttpFetcher};
pub use pdf::{fetch_pdf_text, pdf_bytes_to_text};

use async_trait::async_trait;

/// What kind of content a fetch produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML markup of a rendered page
    Html,
    /// Plain text extracted from a document (PDF)
    Document,
}

/// Content of one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Final URL after redirects
    pub url: String,

    /// Markup or extracted document text
    pub body: String,

    pub kind: ContentKind,
}

impl PageContent {
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            kind: ContentKind::Html,
        }
    }

    pub fn document(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            kind: ContentKind::Document,
        }
    }
}

/// Fetches pages for the crawl
///
/// Implementations are driven strictly sequentially: one page at a time.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a detail page or document
    ///
    /// Returns None on any failure (network, navigation, timeout, bad status).
    async fn fetch(&self, url: &str) -> Option<PageContent>;

    /// Fetches a list page
    ///
    /// List pages are usually heavier than detail pages; implementations may wait longer
    /// for them to settle.
    async fn fetch_listing(&self, url: &str) -> Option<PageContent> {
        self.fetch(url).await
    }

    /// Activates the on-page control matching a CSS selector
    ///
    /// Returns true if the control was found and activated.
    async fn follow(&self, selector: &str) -> bool;

    /// URL the fetcher currently sits on, if any
    async fn current_url(&self) -> Option<String>;
}
