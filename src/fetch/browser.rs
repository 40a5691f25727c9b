//! Headless Chrome page fetcher
//!
//! The browser session is the one shared mutable resource of a run. It is launched
//! once, handed to the coordinator by reference, and must be released with
//! [`BrowserSession::shutdown`] on every exit path.

use crate::config::FetcherConfig;
use crate::fetch::http::build_http_client;
use crate::fetch::pdf::fetch_pdf_text;
use crate::fetch::{PageContent, PageFetcher};
use crate::url::is_pdf_url;
use crate::HarvestError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Polling interval while waiting for a ready selector
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Pause between scrolling a control into view and clicking it
const PRE_CLICK_DELAY: Duration = Duration::from_secs(1);

/// A running Chrome instance with a single tab
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    pdf_client: Client,
    settle_delay: Duration,
    list_settle_delay: Duration,
    pagination_delay: Duration,
    ready_selectors: Vec<String>,
    ready_timeout: Duration,
}

impl BrowserSession {
    /// Launches Chrome and opens the working tab
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserSession)` - Browser is running and ready to navigate
    /// * `Err(HarvestError::Browser)` - Chrome could not be started; the run cannot proceed
    pub async fn launch(config: &FetcherConfig) -> Result<Self, HarvestError> {
        tracing::info!("Launching browser (headless: {})", config.headless);
        let pdf_client = build_http_client(&config.user_agent)?;

        let args = [
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--lang={}", config.language),
            format!("--user-agent={}", config.user_agent),
        ];

        let mut builder = BrowserConfig::builder().window_size(1920, 1080).args(args);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(HarvestError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| HarvestError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(HarvestError::Browser(format!("Failed to open tab: {}", e)));
            }
        };

        Ok(Self {
            browser,
            handler,
            page,
            pdf_client,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            list_settle_delay: Duration::from_millis(config.list_settle_delay_ms),
            pagination_delay: Duration::from_millis(config.pagination_delay_ms),
            ready_selectors: config.ready_selectors.clone(),
            ready_timeout: Duration::from_millis(config.ready_timeout_ms),
        })
    }

    /// Closes the browser and reaps its process
    ///
    /// Errors are logged; shutdown always completes.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down browser");

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
        self.handler.abort();
    }

    /// Waits until an element matching `selector` exists, up to the ready timeout
    ///
    /// A timeout is not an error; the page is used with whatever content it has.
    async fn wait_for_element(&self, selector: &str) -> bool {
        tracing::debug!("Waiting for element: {}", selector);
        let deadline = Instant::now() + self.ready_timeout;

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                tracing::warn!("Wait timeout: {}", selector);
                return false;
            }
            sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    async fn navigate(&self, url: &str, settle: Duration) -> Option<PageContent> {
        if is_pdf_url(url) {
            return fetch_pdf_text(&self.pdf_client, url).await;
        }

        tracing::info!("Accessing: {}", url);
        if let Err(e) = self.page.goto(url).await {
            tracing::error!("Navigation failed ({}): {}", url, e);
            return None;
        }

        sleep(settle).await;

        for selector in &self.ready_selectors {
            self.wait_for_element(selector).await;
        }

        let current = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());

        if is_pdf_url(&current) {
            tracing::info!("Redirected to PDF: {}", current);
            return fetch_pdf_text(&self.pdf_client, &current).await;
        }

        match self.page.content().await {
            Ok(html) => Some(PageContent::html(current, html)),
            Err(e) => {
                tracing::error!("Failed to read page source ({}): {}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserSession {
    async fn fetch(&self, url: &str) -> Option<PageContent> {
        self.navigate(url, self.settle_delay).await
    }

    async fn fetch_listing(&self, url: &str) -> Option<PageContent> {
        self.navigate(url, self.list_settle_delay).await
    }

    async fn follow(&self, selector: &str) -> bool {
        let element = match self.page.find_element(selector).await {
            Ok(element) => element,
            Err(e) => {
                tracing::debug!("Pagination control not found ({}): {}", selector, e);
                return false;
            }
        };

        if let Err(e) = element.scroll_into_view().await {
            tracing::debug!("Could not scroll to {}: {}", selector, e);
        }
        sleep(PRE_CLICK_DELAY).await;

        if let Err(e) = element.click().await {
            tracing::warn!("Click failed on {}: {}", selector, e);
            return false;
        }

        sleep(self.pagination_delay).await;
        true
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }
}
