//! Model-based extraction
//!
//! Pages are cleaned, embedded in a prompt and sent to the language model. Its answer is
//! expected to contain one JSON object, possibly wrapped in prose or a code fence; the
//! object is salvaged from the text and mapped onto records. Anything that cannot be
//! parsed becomes an empty result so that the fallback strategy takes over.

use crate::extract::clean::clean_for_model;
use crate::extract::gemini::GeminiClient;
use crate::extract::prompt::{detail_prompt, list_prompt};
use crate::extract::{DetailExtraction, Extractor, ListAnalysis};
use crate::fetch::PageContent;
use crate::record::{FieldName, Record};
use crate::url::resolve_link;
use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

/// Extracts records by prompting a language model
pub struct ModelExtractor {
    client: Option<GeminiClient>,
    max_input_chars: usize,
    max_deep_links: usize,
}

impl ModelExtractor {
    /// Creates a model extractor
    ///
    /// With no client every call returns an empty result.
    pub fn new(client: Option<GeminiClient>, max_input_chars: usize, max_deep_links: usize) -> Self {
        Self {
            client,
            max_input_chars,
            max_deep_links,
        }
    }

    /// Sends a prompt, returning None when the model is unavailable or fails
    async fn ask(&self, prompt: &str) -> Option<String> {
        let Some(client) = &self.client else {
            tracing::warn!("API key is missing. Skipping model call.");
            return None;
        };

        match client.generate(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("Model call failed ({}): {}", client.model(), e);
                None
            }
        }
    }
}

#[async_trait]
impl Extractor for ModelExtractor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn analyze_list(&self, page: &PageContent) -> ListAnalysis {
        let cleaned = clean_for_model(page, self.max_input_chars);
        match self.ask(&list_prompt(&cleaned)).await {
            Some(answer) => parse_list_response(&answer, &page.url),
            None => ListAnalysis::default(),
        }
    }

    async fn extract_detail(&self, page: &PageContent) -> DetailExtraction {
        let cleaned = clean_for_model(page, self.max_input_chars);
        let prompt = detail_prompt(&cleaned, self.max_deep_links);
        match self.ask(&prompt).await {
            Some(answer) => parse_detail_response(&answer, self.max_deep_links),
            None => DetailExtraction::default(),
        }
    }
}

/// Parses the model's answer for a list page
///
/// Relative candidate URLs are resolved against `page_url`. Returns an empty analysis
/// when the answer holds no JSON object.
pub fn parse_list_response(answer: &str, page_url: &str) -> ListAnalysis {
    let Some(object) = salvage_json_object(answer) else {
        return ListAnalysis::default();
    };

    let base_url = Url::parse(page_url).ok();
    let candidates = object
        .get("articles")
        .and_then(Value::as_array)
        .map(|articles| {
            articles
                .iter()
                .filter_map(Value::as_object)
                .map(|article| {
                    let mut record = record_from_object(article, &FieldName::LISTED);
                    if let (Some(url), Some(base)) = (record.url().map(str::to_string), &base_url) {
                        match resolve_link(&url, base) {
                            Some(absolute) => record.set(FieldName::Url, &absolute),
                            None => record.set(FieldName::Url, &url),
                        };
                    }
                    record
                })
                .collect()
        })
        .unwrap_or_default();

    let next_page_selector = object
        .get("next_page_selector")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|selector| !selector.is_empty() && *selector != "null")
        .map(str::to_string);

    ListAnalysis {
        candidates,
        next_page_selector,
    }
}

/// Parses the model's answer for a detail page
///
/// Deep links are kept in the model's rank order and cut to `max_deep_links`. Returns an
/// empty extraction when the answer holds no JSON object or no `extracted_data`.
pub fn parse_detail_response(answer: &str, max_deep_links: usize) -> DetailExtraction {
    let Some(object) = salvage_json_object(answer) else {
        return DetailExtraction::default();
    };

    let Some(data) = object.get("extracted_data").and_then(Value::as_object) else {
        tracing::debug!("Model answer has no extracted_data object");
        return DetailExtraction::default();
    };

    let deep_links = object
        .get("next_deep_links")
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .take(max_deep_links)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    DetailExtraction {
        fields: record_from_object(data, &FieldName::ALL),
        deep_links,
    }
}

/// Finds the outermost JSON object in free-form model output
fn salvage_json_object(answer: &str) -> Option<Map<String, Value>> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&answer[start..=end]) {
        Ok(Value::Object(object)) => Some(object),
        Ok(_) => None,
        Err(e) => {
            tracing::error!("Failed to parse model JSON: {}", e);
            None
        }
    }
}

/// Maps known keys of a JSON object onto a record; unknown keys are ignored
/// Maps a JSON object onto a record, keeping only the `accepted` fields
fn record_from_object(object: &Map<String, Value>, accepted: &[FieldName]) -> Record {
    let mut record = Record::new();
    for (key, value) in object {
        match FieldName::from_key(key) {
            Some(field) if !accepted.contains(&field) => {
                tracing::trace!("Ignoring '{}' outside the accepted fields", key)
            }
            Some(field) => {
                if let Some(text) = value_to_text(value) {
                    record.set(field, &text);
                }
            }
            None => tracing::trace!("Ignoring unknown field '{}'", key),
        }
    }
    record
}

/// Renders a JSON value as field text
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://portal.example.eu/screen/opportunities/calls-for-tenders";

    #[test]
    fn test_parse_list_in_code_fence() {
        let answer = r#"Here you go:
```json
{
  "articles": [
    {"url": "https://portal.example.eu/tender-details/1", "title": "Grant A", "amount": "€50,000", "articleType": "Open"},
    {"url": "/tender-details/2", "title": "Grant B", "amount": "不明"}
  ],
  "next_page_selector": "a.next"
}
```"#;

        let analysis = parse_list_response(answer, PAGE_URL);

        assert_eq!(analysis.candidates.len(), 2);
        let first = &analysis.candidates[0];
        assert_eq!(first.title(), Some("Grant A"));
        assert_eq!(first.get(FieldName::Amount), Some("€50,000"));
        assert_eq!(first.get(FieldName::ArticleType), Some("Open"));
        let second = &analysis.candidates[1];
        assert_eq!(second.url(), Some("https://portal.example.eu/tender-details/2"));
        assert!(!second.is_set(FieldName::Amount));
        assert_eq!(analysis.next_page_selector, Some("a.next".to_string()));
    }

    #[test]
    fn test_list_stub_keeps_only_listed_fields() {
        let answer = r#"{"articles": [{
            "url": "/tender-details/3",
            "title": "Grant C",
            "issuingOrganization": "DG RTD",
            "publicationDate": "2025-03-01",
            "summary": "Should wait for the detail page",
            "keywords": ["ocean", "climate"],
            "country": "BE"
        }]}"#;

        let stub = &parse_list_response(answer, PAGE_URL).candidates[0];

        assert_eq!(stub.title(), Some("Grant C"));
        assert_eq!(stub.get(FieldName::IssuingOrganization), Some("DG RTD"));
        assert_eq!(stub.get(FieldName::PublicationDate), Some("2025-03-01"));
        assert!(!stub.is_set(FieldName::Summary));
        assert!(!stub.is_set(FieldName::Keywords));
        assert!(!stub.is_set(FieldName::Country));
    }

    #[test]
    fn test_parse_list_null_selector() {
        let answer = r#"{"articles": [], "next_page_selector": null}"#;
        let analysis = parse_list_response(answer, PAGE_URL);
        assert!(!analysis.is_usable());
        assert_eq!(analysis.next_page_selector, None);

        let answer = r#"{"articles": [], "next_page_selector": "null"}"#;
        assert_eq!(parse_list_response(answer, PAGE_URL).next_page_selector, None);
    }

    #[test]
    fn test_parse_list_keeps_unresolvable_url_as_given() {
        let answer = r#"{"articles": [{"url": "unknown", "title": "No link"}]}"#;
        let analysis = parse_list_response(answer, PAGE_URL);
        assert_eq!(analysis.candidates.len(), 1);
        assert_eq!(analysis.candidates[0].url(), None);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert_eq!(parse_list_response("", PAGE_URL), ListAnalysis::default());
        assert_eq!(
            parse_list_response("Sorry, I cannot help with that.", PAGE_URL),
            ListAnalysis::default()
        );
        assert_eq!(
            parse_list_response("{ this is not json }", PAGE_URL),
            ListAnalysis::default()
        );
        assert_eq!(parse_detail_response("} backwards {", 3), DetailExtraction::default());
    }

    #[test]
    fn test_parse_detail() {
        let answer = r#"{
            "extracted_data": {
                "title": "Digital Europe call",
                "amount": 2500000,
                "country": "unknown",
                "keywords": ["AI", "health", null],
                "researchStartDate": "",
                "deadline": "05-01-2025"
            },
            "next_deep_links": ["https://portal.example.eu/doc.pdf", "  ", "/faq", "https://portal.example.eu/c", "https://portal.example.eu/d"]
        }"#;

        let extraction = parse_detail_response(answer, 3);

        assert_eq!(extraction.fields.title(), Some("Digital Europe call"));
        assert_eq!(extraction.fields.get(FieldName::Amount), Some("2500000"));
        assert_eq!(extraction.fields.get(FieldName::Keywords), Some("AI, health"));
        assert!(!extraction.fields.is_set(FieldName::Country));
        assert!(!extraction.fields.is_set(FieldName::ResearchStartDate));
        assert_eq!(
            extraction.deep_links,
            vec![
                "https://portal.example.eu/doc.pdf".to_string(),
                "/faq".to_string(),
                "https://portal.example.eu/c".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_detail_without_extracted_data() {
        let answer = r#"{"next_deep_links": ["https://portal.example.eu/doc.pdf"]}"#;
        assert_eq!(parse_detail_response(answer, 3), DetailExtraction::default());
    }

    #[test]
    fn test_parse_detail_zero_link_budget() {
        let answer = r#"{"extracted_data": {"title": "T"}, "next_deep_links": ["https://a.eu/x"]}"#;
        assert!(parse_detail_response(answer, 0).deep_links.is_empty());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&Value::Null), None);
        assert_eq!(value_to_text(&serde_json::json!(true)), Some("true".to_string()));
        assert_eq!(value_to_text(&serde_json::json!([])), None);
        assert_eq!(value_to_text(&serde_json::json!(1.5)), Some("1.5".to_string()));
    }

    #[tokio::test]
    async fn test_without_client_returns_empty() {
        let extractor = ModelExtractor::new(None, 90_000, 3);
        let page = PageContent::html(PAGE_URL, "<html><body><a href='/x'>x</a></body></html>");

        assert!(!extractor.analyze_list(&page).await.is_usable());
        assert!(!extractor.extract_detail(&page).await.is_usable());
    }
}
