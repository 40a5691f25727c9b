//! HTTP page fetcher
//!
//! This fetcher serves portals that render on the server. It handles:
//! - Building the HTTP client with the configured user agent
//! - GET requests with redirect following
//! - PDF detection by URL and by Content-Type
//! - Pagination by following the `href` of the element a selector picks out
//!
//! Every failure is logged and reported as `None`.

use crate::fetch::pdf::fetch_pdf_text;
use crate::fetch::{PageContent, PageFetcher};
use crate::url::{is_pdf_url, resolve_link};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent string sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over plain HTTP
pub struct HttpFetcher {
    client: Client,
    settle_delay: Duration,
    last_page: Mutex<Option<PageContent>>,
}

impl HttpFetcher {
    /// Creates a fetcher using the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            settle_delay: Duration::ZERO,
            last_page: Mutex::new(None),
        }
    }

    /// Pauses this long after every successful fetch
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    fn remember(&self, page: &PageContent) {
        if let Ok(mut last) = self.last_page.lock() {
            *last = Some(page.clone());
        }
    }

    async fn get(&self, url: &str) -> Option<PageContent> {
        if is_pdf_url(url) {
            return fetch_pdf_text(&self.client, url).await;
        }

        tracing::info!("Accessing: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                if e.is_timeout() {
                    tracing::warn!("Request timeout for {}", url);
                } else {
                    tracing::warn!("Request failed for {}: {}", url, e);
                }
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("HTTP {} for {}", status.as_u16(), url);
            return None;
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if content_type.contains("application/pdf") || is_pdf_url(&final_url) {
            // Redirected or served as PDF; download it as a document
            return fetch_pdf_text(&self.client, &final_url).await;
        }

        match response.text().await {
            Ok(body) => Some(PageContent::html(final_url, body)),
            Err(e) => {
                tracing::warn!("Failed to read body from {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<PageContent> {
        let page = self.get(url).await?;
        self.remember(&page);

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Some(page)
    }

    async fn follow(&self, selector: &str) -> bool {
        let target = {
            let last = match self.last_page.lock() {
                Ok(last) => last,
                Err(_) => return false,
            };
            match last.as_ref() {
                Some(page) => find_link_target(page, selector),
                None => None,
            }
        };

        let Some(target) = target else {
            tracing::debug!("No followable element for selector: {}", selector);
            return false;
        };

        tracing::debug!("Following {} -> {}", selector, target);
        self.fetch(&target).await.is_some()
    }

    async fn current_url(&self) -> Option<String> {
        self.last_page
            .lock()
            .ok()
            .and_then(|last| last.as_ref().map(|page| page.url.clone()))
    }
}

/// Resolves the href of the first element matching `selector` in a fetched page
///
/// A selector may name the anchor itself or a container around it; in the latter case
/// the first descendant anchor is used.
fn find_link_target(page: &PageContent, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let anchor = Selector::parse("a[href]").ok()?;
    let base_url = Url::parse(&page.url).ok()?;
    let document = Html::parse_document(&page.body);

    let element = document.select(&selector).next()?;
    let href = match element.value().attr("href") {
        Some(href) => href.to_string(),
        None => element
            .select(&anchor)
            .next()
            .and_then(|a| a.value().attr("href"))?
            .to_string(),
    };

    resolve_link(&href, &base_url)
}
