use crate::record::FieldName;
use serde::Deserialize;

/// Main configuration structure for Grant-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl scope and resolution budget
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First list page of the portal
    #[serde(rename = "target-url")]
    pub target_url: String,

    /// Maximum number of list pages to walk
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum number of records to resolve per run
    #[serde(rename = "max-records", default = "default_max_records")]
    pub max_records: u32,

    /// Maximum number of deep links followed per record
    #[serde(rename = "max-deep-links", default = "default_max_deep_links")]
    pub max_deep_links: u32,

    /// Pause between two deep-link fetches (milliseconds)
    #[serde(rename = "deep-link-delay-ms", default = "default_deep_link_delay_ms")]
    pub deep_link_delay_ms: u64,

    /// Fields that must be known before a record counts as complete
    #[serde(rename = "required-fields", default = "default_required_fields")]
    pub required_fields: Vec<FieldName>,
}

/// Which page fetcher drives the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// Headless Chrome session
    #[default]
    Browser,
    /// Plain HTTP client, no JavaScript
    Http,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub backend: FetcherBackend,

    /// Run Chrome without a window
    pub headless: bool,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Browser UI language passed as `--lang`
    pub language: String,

    /// Wait after navigating to a detail page (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Wait after navigating to a list page (milliseconds)
    #[serde(rename = "list-settle-delay-ms")]
    pub list_settle_delay_ms: u64,

    /// Wait after clicking the pagination control (milliseconds)
    #[serde(rename = "pagination-delay-ms")]
    pub pagination_delay_ms: u64,

    /// CSS selectors waited on before a page counts as loaded
    #[serde(rename = "ready-selectors")]
    pub ready_selectors: Vec<String>,

    /// Upper bound for each ready-selector wait (milliseconds)
    #[serde(rename = "ready-timeout-ms")]
    pub ready_timeout_ms: u64,
}

/// Extractor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Gemini model name
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API root, without the version segment
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum characters of cleaned page content sent in one prompt
    #[serde(rename = "max-input-chars")]
    pub max_input_chars: usize,

    /// Substring identifying detail-page links in the heuristic list scan
    #[serde(rename = "detail-url-pattern")]
    pub detail_url_pattern: String,

    /// Cap on stubs produced by the heuristic list scan
    #[serde(rename = "heuristic-max-candidates")]
    pub heuristic_max_candidates: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the CSV file
    pub directory: String,

    /// File name prefix; a timestamp and `.csv` are appended
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}

fn default_max_pages() -> u32 {
    1
}

fn default_max_records() -> u32 {
    5
}

fn default_max_deep_links() -> u32 {
    3
}

fn default_deep_link_delay_ms() -> u64 {
    2000
}

fn default_required_fields() -> Vec<FieldName> {
    FieldName::ALL.to_vec()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: FetcherBackend::Browser,
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            language: "ja-JP".to_string(),
            settle_delay_ms: 4000,
            list_settle_delay_ms: 7000,
            pagination_delay_ms: 3000,
            ready_selectors: vec![
                "ux-page-header".to_string(),
                ".tender-results-list".to_string(),
            ],
            ready_timeout_ms: 10_000,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_input_chars: 90_000,
            detail_url_pattern: "tenders/opportunities/portal/screen/opportunities/".to_string(),
            heuristic_max_candidates: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_prefix: "crawled_data".to_string(),
        }
    }
}
