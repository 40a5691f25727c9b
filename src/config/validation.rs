use crate::config::types::{Config, CrawlerConfig, ExtractorConfig, FetcherConfig, OutputConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl scope and budgets
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.target_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid target-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "target-url must use http or https, got '{}'",
            config.target_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_records < 1 {
        return Err(ConfigError::Validation(format!(
            "max-records must be >= 1, got {}",
            config.max_records
        )));
    }

    // max-deep-links = 0 is allowed: records are resolved from their detail page only

    if config.required_fields.is_empty() {
        return Err(ConfigError::Validation(
            "required-fields cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in &config.required_fields {
        if !seen.insert(*field) {
            return Err(ConfigError::Validation(format!(
                "required-fields lists '{}' more than once",
                field
            )));
        }
    }

    Ok(())
}

/// Validates fetcher timings and selectors
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.ready_selectors.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "ready-selectors cannot contain empty selectors".to_string(),
        ));
    }

    Ok(())
}

/// Validates model endpoint and heuristic limits
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if config.max_input_chars < 1000 {
        return Err(ConfigError::Validation(format!(
            "max-input-chars must be >= 1000, got {}",
            config.max_input_chars
        )));
    }

    if config.heuristic_max_candidates < 1 {
        return Err(ConfigError::Validation(format!(
            "heuristic-max-candidates must be >= 1, got {}",
            config.heuristic_max_candidates
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file-prefix cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.contains('/') || config.file_prefix.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "file-prefix must not contain path separators, got '{}'",
            config.file_prefix
        )));
    }

    Ok(())
}
