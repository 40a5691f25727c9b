//! Shared helpers for the integration tests

use grant_harvester::config::{parse_config, Config};
use grant_harvester::extract::{FallbackExtractor, GeminiClient, HeuristicExtractor, ModelExtractor};
use std::path::{Path, PathBuf};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MODEL: &str = "test-model";

/// Builds a config for a run against `target_url`, writing into `output_dir`
pub fn test_config(target_url: &str, output_dir: &Path, max_pages: u32, required: &[&str]) -> Config {
    let required = required
        .iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(", ");

    parse_config(&format!(
        r#"
[crawler]
target-url = "{target_url}"
max-pages = {max_pages}
max-records = 10
max-deep-links = 3
deep-link-delay-ms = 0
required-fields = [{required}]

[fetcher]
backend = "http"

[output]
directory = '{}'
file-prefix = "test_run"
"#,
        output_dir.display()
    ))
    .expect("test config must be valid")
}

/// Model extractor pointed at a mock endpoint, backed by the heuristic extractor
pub fn extractor_with_model(
    model_server: Option<&MockServer>,
) -> FallbackExtractor<ModelExtractor, HeuristicExtractor> {
    let client = model_server
        .map(|server| GeminiClient::new("test-key", MODEL).with_base_url(server.uri()));
    FallbackExtractor::new(
        ModelExtractor::new(client, 90_000, 3),
        HeuristicExtractor::new("/grant/", 10),
    )
}

/// Serves an HTML page on the portal mock
pub async fn serve_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Makes the model answer `answer` whenever the prompt contains `marker`
pub async fn model_answers(server: &MockServer, marker: &str, answer: &str) {
    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": answer}], "role": "model"}}]
    });

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Finds the single CSV file written into `dir`
pub fn written_csv(dir: &Path) -> PathBuf {
    let files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("output dir must exist")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    assert_eq!(files.len(), 1, "expected exactly one CSV file, found {files:?}");
    files[0].clone()
}

/// Reads a CSV file written by the harvester into header and rows
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let text = std::fs::read_to_string(path).expect("CSV must be readable");
    assert!(text.starts_with('\u{feff}'), "CSV must start with a BOM");

    let mut reader = csv::Reader::from_reader(text.trim_start_matches('\u{feff}').as_bytes());
    let header = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|row| row.expect("row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
