//! End-to-end harvest over a mock portal and a mock model endpoint

use crate::common::{
    extractor_with_model, model_answers, read_csv, serve_page, test_config, written_csv,
};
use grant_harvester::crawler::harvest;
use grant_harvester::fetch::{build_http_client, HttpFetcher};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_harvest_paginates_and_follows_deep_links() {
    let portal = MockServer::start().await;
    let model = MockServer::start().await;
    let base = portal.uri();

    serve_page(
        &portal,
        "/list/1",
        r#"<html><body><div>LIST-ONE</div>
        <a href="/grant/1">Grant One</a>
        <nav><a class="next" href="/list/2">Next</a></nav>
        </body></html>"#,
    )
    .await;
    serve_page(
        &portal,
        "/list/2",
        r#"<html><body><div>LIST-TWO</div><a href="/grant/2">Grant Two</a></body></html>"#,
    )
    .await;
    serve_page(
        &portal,
        "/grant/1",
        r#"<html><body><h1>Grant One</h1><p>DETAIL-ONE</p><a href="/docs/1">Call document</a></body></html>"#,
    )
    .await;
    serve_page(
        &portal,
        "/docs/1",
        r#"<html><body><p>DOC-ONE: the maximum grant is EUR 75,000.</p></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/grant/2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&portal)
        .await;

    model_answers(
        &model,
        "LIST-ONE",
        r#"```json
{"articles": [{"url": "/grant/1", "title": "Grant One", "amount": "unknown"}], "next_page_selector": "a.next"}
```"#,
    )
    .await;
    model_answers(
        &model,
        "LIST-TWO",
        &format!(
            r#"{{"articles": [{{"url": "{base}/grant/2", "title": "Grant Two", "amount": "€5,000"}}], "next_page_selector": null}}"#
        ),
    )
    .await;
    model_answers(
        &model,
        "DETAIL-ONE",
        &format!(
            r#"{{"extracted_data": {{"title": "Grant One (2025 call)", "amount": "unknown", "country": "BE"}},
                "next_deep_links": ["{base}/docs/1", "{base}/grant/1"]}}"#
        ),
    )
    .await;
    model_answers(
        &model,
        "DOC-ONE",
        r#"{"extracted_data": {"title": "Document title", "amount": "EUR 75,000", "funder": "EU"}, "next_deep_links": []}"#,
    )
    .await;

    let output_dir = TempDir::new().unwrap();
    let config = test_config(
        &format!("{base}/list/1"),
        output_dir.path(),
        2,
        &["title", "url", "amount"],
    );
    let fetcher = HttpFetcher::new(build_http_client("TestHarvester/1.0").unwrap());
    let extractor = extractor_with_model(Some(&model));

    let summary = harvest(&config, &fetcher, &extractor).await.unwrap();

    assert_eq!(summary.list_pages, 2);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.complete, 1);
    assert_eq!(summary.primary_unavailable, 1);
    assert_eq!(summary.deep_links_fetched, 1);

    let csv_path = written_csv(output_dir.path());
    assert_eq!(summary.output_path.as_deref(), Some(csv_path.as_path()));
    let file_name = csv_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("test_run_"));

    let (header, rows) = read_csv(&csv_path);
    assert_eq!(
        &header[..6],
        &["title", "url", "amount", "summary", "articleType", "description"]
    );
    assert_eq!(rows.len(), 2);

    // Detail page wins over the stub, the deep link only fills gaps
    let column = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(rows[0][column("title")], "Grant One (2025 call)");
    assert_eq!(rows[0][column("url")], format!("{base}/grant/1"));
    assert_eq!(rows[0][column("amount")], "EUR 75,000");
    assert_eq!(rows[0][column("country")], "BE");
    assert_eq!(rows[0][column("funder")], "EU");
    assert_eq!(rows[0][column("keywords")], "unknown");

    // Unreachable detail page keeps the stub as listed
    assert_eq!(rows[1][column("title")], "Grant Two");
    assert_eq!(rows[1][column("amount")], "€5,000");
    assert_eq!(rows[1][column("summary")], "unknown");
}

#[tokio::test]
async fn test_harvest_without_candidates_writes_nothing() {
    let portal = MockServer::start().await;
    serve_page(&portal, "/list", "<html><body><p>No calls open.</p></body></html>").await;

    let output_dir = TempDir::new().unwrap();
    let config = test_config(
        &format!("{}/list", portal.uri()),
        output_dir.path(),
        3,
        &["title", "url"],
    );
    let fetcher = HttpFetcher::new(build_http_client("TestHarvester/1.0").unwrap());
    let extractor = extractor_with_model(None);

    let summary = harvest(&config, &fetcher, &extractor).await.unwrap();

    assert_eq!(summary.list_pages, 1);
    assert_eq!(summary.records, 0);
    assert!(summary.output_path.is_none());
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_harvest_unreachable_portal() {
    let portal = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&portal)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = test_config(
        &format!("{}/list", portal.uri()),
        output_dir.path(),
        2,
        &["title"],
    );
    let fetcher = HttpFetcher::new(build_http_client("TestHarvester/1.0").unwrap());
    let extractor = extractor_with_model(None);

    let summary = harvest(&config, &fetcher, &extractor).await.unwrap();

    assert_eq!(summary.list_pages, 0);
    assert_eq!(summary.records, 0);
}
