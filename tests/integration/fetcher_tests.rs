//! HTTP fetcher behaviour against a mock portal

use crate::common::serve_page;
use grant_harvester::fetch::{build_http_client, ContentKind, HttpFetcher, PageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(build_http_client("TestHarvester/1.0").unwrap())
}

#[tokio::test]
async fn test_fetch_html_page() {
    let server = MockServer::start().await;
    serve_page(&server, "/grant/1", "<html><body><h1>Grant</h1></body></html>").await;

    let fetcher = fetcher();
    let page = fetcher
        .fetch(&format!("{}/grant/1", server.uri()))
        .await
        .expect("page should be fetched");

    assert_eq!(page.kind, ContentKind::Html);
    assert!(page.body.contains("<h1>Grant</h1>"));
    assert_eq!(
        fetcher.current_url().await,
        Some(format!("{}/grant/1", server.uri()))
    );
}

#[tokio::test]
async fn test_fetch_failure_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    assert!(fetcher.fetch(&format!("{}/gone", server.uri())).await.is_none());
    assert!(fetcher.current_url().await.is_none());
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    serve_page(&server, "/new", "<html><body>moved</body></html>").await;

    let page = fetcher()
        .fetch(&format!("{}/old", server.uri()))
        .await
        .expect("redirect target should be fetched");

    assert_eq!(page.url, format!("{}/new", server.uri()));
}

#[tokio::test]
async fn test_unreadable_pdf_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/call.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"not really a pdf".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    assert!(fetcher()
        .fetch(&format!("{}/call.pdf", server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_follow_pagination_link() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/list",
        r#"<html><body><ul class="pager"><li><a href="/list?page=2">2</a></li></ul></body></html>"#,
    )
    .await;

    let fetcher = fetcher();
    fetcher.fetch(&format!("{}/list", server.uri())).await.unwrap();

    assert!(fetcher.follow("ul.pager").await);
    assert_eq!(
        fetcher.current_url().await,
        Some(format!("{}/list?page=2", server.uri()))
    );
    assert!(!fetcher.follow("a.does-not-exist").await);
}
