//! Model failures falling back to heuristic extraction

use crate::common::{
    extractor_with_model, model_answers, read_csv, serve_page, test_config, written_csv, MODEL,
};
use grant_harvester::crawler::harvest;
use grant_harvester::extract::Extractor;
use grant_harvester::fetch::{build_http_client, HttpFetcher, PageContent};
use grant_harvester::FieldName;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OCEAN_DETAIL: &str = r#"<html><head>
    <meta name="description" content="Fellowships for early-career ocean scientists.">
    </head><body><p>DETAIL-OCEAN</p><h1>Ocean research fellowship 2025</h1></body></html>"#;

#[tokio::test]
async fn test_empty_model_answers_fall_back_to_heuristics() {
    let portal = MockServer::start().await;
    let model = MockServer::start().await;

    serve_page(
        &portal,
        "/list",
        r#"<html><body><div>LIST-OCEAN</div>
        <a href="/grant/7">Ocean research fellowship</a>
        <a href="/about">About this portal</a>
        </body></html>"#,
    )
    .await;
    serve_page(&portal, "/grant/7", OCEAN_DETAIL).await;

    model_answers(&model, "LIST-OCEAN", r#"{"articles": [], "next_page_selector": null}"#).await;
    model_answers(&model, "DETAIL-OCEAN", "I could not find any grant details.").await;

    let output_dir = TempDir::new().unwrap();
    let config = test_config(
        &format!("{}/list", portal.uri()),
        output_dir.path(),
        1,
        &["title", "url", "summary"],
    );
    let fetcher = HttpFetcher::new(build_http_client("TestHarvester/1.0").unwrap());
    let extractor = extractor_with_model(Some(&model));

    let summary = harvest(&config, &fetcher, &extractor).await.unwrap();

    assert_eq!(summary.records, 1);
    assert_eq!(summary.complete, 1);

    let (header, rows) = read_csv(&written_csv(output_dir.path()));
    let column = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(rows[0][column("title")], "Ocean research fellowship 2025");
    assert_eq!(rows[0][column("url")], format!("{}/grant/7", portal.uri()));
    assert_eq!(
        rows[0][column("summary")],
        "Fellowships for early-career ocean scientists."
    );
    assert_eq!(rows[0][column("amount")], "unknown");
}

#[tokio::test]
async fn test_model_http_error_falls_back_to_heuristics() {
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{MODEL}:generateContent")))
        .and(body_string_contains("DETAIL-OCEAN"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&model)
        .await;

    let extractor = extractor_with_model(Some(&model));
    let page = PageContent::html("https://portal.example.eu/grant/7", OCEAN_DETAIL);

    let extraction = extractor.extract_detail(&page).await;

    assert_eq!(
        extraction.fields.title(),
        Some("Ocean research fellowship 2025")
    );
    assert!(extraction.fields.is_set(FieldName::Summary));
    assert!(extraction.deep_links.is_empty());
}

#[tokio::test]
async fn test_model_answer_used_when_usable() {
    let model = MockServer::start().await;
    model_answers(
        &model,
        "DETAIL-OCEAN",
        r#"{"extracted_data": {"title": "Blue Horizons Fellowship", "amount": "unknown"}, "next_deep_links": ["https://portal.example.eu/guide.pdf"]}"#,
    )
    .await;

    let extractor = extractor_with_model(Some(&model));
    let page = PageContent::html("https://portal.example.eu/grant/7", OCEAN_DETAIL);

    let extraction = extractor.extract_detail(&page).await;

    assert_eq!(extraction.fields.title(), Some("Blue Horizons Fellowship"));
    assert!(!extraction.fields.is_set(FieldName::Summary));
    assert_eq!(
        extraction.deep_links,
        vec!["https://portal.example.eu/guide.pdf".to_string()]
    );
}
