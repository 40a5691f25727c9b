//! Grant-Harvester: a completeness-driven opportunity harvester
//!
//! This crate crawls a paginated funding/tender portal, extracts candidate records from
//! its list pages and resolves each candidate by visiting its detail page and
//! follow-up "deep links" until every required field is known or the link budget is
//! spent.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod record;
pub mod url;

use thiserror::Error;

/// Main error type for Grant-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while talking to the language model endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured (set {0})")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response contained no text")]
    EmptyResponse,
}

/// Result type alias for Grant-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RecordResolver, Resolution, ResolutionOutcome};
pub use extract::{DetailExtraction, Extractor, ListAnalysis};
pub use fetch::{PageContent, PageFetcher};
pub use record::{FieldName, MergeMode, Record};
