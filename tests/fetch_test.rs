use std::io::Write;
use std::time::{Duration, Instant};

use openapi_docs_mcp::error::DocsError;
use openapi_docs_mcp::fetch::{HttpFetcher, SourceFetcher};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn document() -> serde_json::Value {
    json!({ "openapi": "3.0.0", "info": { "title": "Remote", "version": "1" }, "paths": {} })
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_fetch_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let value = fetcher
        .fetch(&format!("{}/openapi.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(value, document());
}

#[tokio::test]
async fn test_server_errors_are_retried_with_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let url = format!("{}/openapi.json", server.uri());
    let started = Instant::now();
    let err = fetcher.fetch(&url).await.unwrap_err();

    // 100 ms before the second attempt, 200 ms before the third
    assert!(started.elapsed() >= Duration::from_millis(300));
    match err {
        DocsError::Fetch { url: failed, message } => {
            assert_eq!(failed, url);
            assert!(message.contains("503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rate_limit_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document()))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let value = fetcher
        .fetch(&format!("{}/openapi.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(value, document());
}

#[tokio::test]
async fn test_client_errors_fail_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let err = fetcher
        .fetch(&format!("{}/missing.json", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(&err, DocsError::Fetch { message, .. } if message.contains("404")));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let url = format!("{}/index.html", server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert!(matches!(err, DocsError::Decode { url: failed, .. } if failed == url));
}

#[tokio::test]
async fn test_fetch_local_file() {
    let file = temp_file(&document().to_string());
    let path = file.path().to_str().unwrap();
    let fetcher = HttpFetcher::new().unwrap();

    // plain path
    assert_eq!(fetcher.fetch(path).await.unwrap(), document());

    // file:// prefix
    let url = format!("file://{path}");
    assert_eq!(fetcher.fetch(&url).await.unwrap(), document());
}

#[tokio::test]
async fn test_local_file_errors() {
    let fetcher = HttpFetcher::new().unwrap();

    let file = temp_file("openapi: 3.0.0");
    let path = file.path().to_str().unwrap().to_string();
    let err = fetcher.fetch(&path).await.unwrap_err();
    assert!(matches!(err, DocsError::Decode { url, .. } if url == path));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let missing = missing.to_str().unwrap();
    let err = fetcher.fetch(missing).await.unwrap_err();
    assert!(matches!(err, DocsError::Io { path, .. } if path == missing));
}
