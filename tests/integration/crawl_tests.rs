//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the reqwest transport.

use sitewalk::config::{load_config, Config};
use sitewalk::crawler::crawl;
use sitewalk::output::{read_report, write_report};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short poll interval and a safety pass limit
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.poll_interval_ms = 10;
    config.crawler.max_passes = Some(2_000);
    config.user_agent.crawler_name = "TestBot".to_string();
    config.fetch.request_timeout_secs = 5;
    config.fetch.connect_timeout_secs = 2;
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(expected_fetches)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r##"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="./page1">Page 1 again</a>
            <a href="{}/page2">Page 2</a>
            <a href="mailto:owner@example.com">Mail</a>
            <a href="https://elsewhere.org/page">Elsewhere</a>
            <a href="#">Top</a>
            </body></html>"##,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        format!(
            r#"<html><body>
            <a href="/page2">Page 2</a>
            <a href="{}">Home</a>
            </body></html>"#,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page2",
        "<html><body><p>Leaf</p></body></html>".to_string(),
        1,
    )
    .await;

    let report = crawl(&base_url, &create_test_config())
        .await
        .expect("crawl should start");

    assert!(report.complete);
    assert_eq!(report.seed, base_url);
    assert_eq!(report.links.len(), 3);

    let home = report.get(&base_url).expect("seed record");
    assert_eq!(home.reference_count, 2);

    let page1 = report.get(&format!("{}/page1", base_url)).expect("page1 record");
    assert_eq!(page1.reference_count, 2);

    let page2 = report.get(&format!("{}/page2", base_url)).expect("page2 record");
    assert_eq!(page2.reference_count, 2);

    for (url, record) in &report.links {
        assert!(record.visited, "{} should be visited", url);
        assert!(!record.in_flight, "{} should not be in flight", url);
        assert_eq!(record.status, Some(200), "{} should have status 200", url);
        assert_eq!(record.attempts, 1, "{} should be fetched once", url);
    }

    assert_eq!(report.outcomes.crawled, 3);
}

#[tokio::test]
async fn test_missing_page_is_recorded_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&base_url, &create_test_config()).await.unwrap();

    assert!(report.complete);
    let missing = report.get(&format!("{}/missing", base_url)).unwrap();
    assert!(missing.visited);
    assert_eq!(missing.status, Some(404));
    assert_eq!(report.outcomes.checked, 1);
}

#[tokio::test]
async fn test_internal_server_error_is_terminal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/broken">Broken</a>"#.to_string(), 1).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&base_url, &create_test_config()).await.unwrap();

    assert!(report.complete);
    let broken = report.get(&format!("{}/broken", base_url)).unwrap();
    assert!(broken.visited);
    assert_eq!(broken.status, Some(500));
}

#[tokio::test]
async fn test_unavailable_page_retried_until_cap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/busy">Busy</a>"#.to_string(), 1).await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.max_attempts = Some(3);

    let report = crawl(&base_url, &config).await.unwrap();

    assert!(report.complete);
    let busy = report.get(&format!("{}/busy", base_url)).unwrap();
    assert!(busy.visited);
    assert!(busy.exhausted);
    assert_eq!(busy.attempts, 3);
    assert_eq!(busy.status, Some(503));
    assert_eq!(report.outcomes.retried, 2);
    assert_eq!(report.outcomes.exhausted, 1);
}

#[tokio::test]
async fn test_non_html_resources_are_removed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/brochure">Brochure</a><a href="/report.pdf">Report</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/brochure"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Filtered by extension before any request is made
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let report = crawl(&base_url, &create_test_config()).await.unwrap();

    assert!(report.complete);
    assert_eq!(report.links.len(), 1);
    assert!(report.get(&format!("{}/brochure", base_url)).is_none());
    assert_eq!(report.outcomes.excluded, 1);
}

#[tokio::test]
async fn test_unreachable_seed_exhausts() {
    let mut config = create_test_config();
    config.crawler.max_attempts = Some(2);

    // Nothing listens on port 1
    let seed = "http://127.0.0.1:1";
    let report = crawl(seed, &config).await.unwrap();

    assert!(report.complete);
    let record = report.get(seed).unwrap();
    assert!(record.visited);
    assert!(record.exhausted);
    assert_eq!(record.attempts, 2);
    assert_eq!(record.status, None);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let result = crawl("ftp://example.com", &create_test_config()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_crawl_from_config_file_and_save_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/about">About</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/about", "<p>About us</p>".to_string(), 1).await;

    let mut config_file = NamedTempFile::new().unwrap();
    config_file
        .write_all(
            br#"
[crawler]
poll-interval-ms = 10
max-passes = 2000

[user-agent]
crawler-name = "TestBot"
"#,
        )
        .unwrap();
    let config = load_config(config_file.path()).unwrap();

    let report = crawl(&base_url, &config).await.unwrap();
    assert!(report.complete);
    assert_eq!(report.links.len(), 2);

    let dir = tempdir().unwrap();
    let report_path = dir.path().join("report.json");
    write_report(&report, &report_path).unwrap();

    let loaded = read_report(&report_path).unwrap();
    assert_eq!(loaded.links, report.links);
    assert_eq!(loaded.seed, base_url);
    assert!(loaded.complete);
}
