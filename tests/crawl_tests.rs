//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! full crawl cycle end-to-end: frontier, fetcher, scope policy, sink, and
//! coordinator together.

use scuttle::config::{Config, CrawlerConfig, OutputConfig};
use scuttle::crawler::{crawl, Coordinator};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into the given directory
fn test_config(output_dir: &str, max_depth: u32, concurrency: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            concurrency,
            timeout_secs: 5,
            retries: 0,
            include_subdomains: false,
            scope_filter: None,
        },
        output: OutputConfig {
            directory: output_dir.to_string(),
        },
    }
}

/// Mounts an HTML page at `route` with the given body
async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

/// Mounts an HTML page that must be fetched exactly once
async fn mount_page_once(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .expect(1)
        .mount(server)
        .await;
}

async fn run_crawl(config: Config, seed: &str) -> scuttle::CrawlSummary {
    let seed = Url::parse(seed).unwrap();
    crawl(config, seed).await.expect("Crawl failed")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/page1", "<html><body>Content 1</body></html>").await;
    mount_page(&server, "/page2", "<html><body>Content 2</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 2, 4);
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.urls_seen, 3);
    assert!(summary.bytes_stored > 0);

    // Pages are mirrored under the output directory
    assert!(dir.path().join("index.html").exists());
    assert!(dir.path().join("page1/index.html").exists());
    assert!(dir.path().join("page2/index.html").exists());
}

#[tokio::test]
async fn test_fully_connected_site_fetched_exactly_once_per_pool_size() {
    // Every page links to every other page; the frontier must still admit
    // each URL exactly once, regardless of how many workers race on it.
    for concurrency in [1, 4, 64] {
        let server = MockServer::start().await;
        let pages = 6;

        for i in 0..pages {
            let links: String = (0..pages)
                .map(|j| format!(r#"<a href="/p{}">p{}</a>"#, j, j))
                .collect();
            let body = format!("<html><body>{}</body></html>", links);
            mount_page_once(&server, &format!("/p{}", i), &body).await;
        }

        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path().to_str().unwrap(), 10, concurrency);
        let summary = run_crawl(config, &format!("{}/p0", server.uri())).await;

        assert_eq!(
            summary.pages_fetched, pages as u64,
            "pool size {} fetched the wrong number of pages",
            concurrency
        );
        assert_eq!(summary.pages_failed, 0);

        // expect(1) on every page is verified when the server drops
        drop(server);
    }
}

#[tokio::test]
async fn test_http_404_counted_and_crawl_continues() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/missing">gone</a>
            <a href="/alive">here</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/alive", "<html><body>ok</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 2, 4);
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.http_errors, 1);
}

#[tokio::test]
async fn test_off_domain_links_never_contacted() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    // The "other" server must receive no requests at all
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&other)
        .await;

    mount_page(
        &server,
        "/a.html",
        &format!(
            r#"<html><body>
                <a href="/b.html">same domain</a>
                <a href="{}/x.html">other domain</a>
            </body></html>"#,
            other.uri()
        ),
    )
    .await;
    mount_page(&server, "/b.html", "<html><body>b</body></html>").await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 1, 4);
    let summary = run_crawl(config, &format!("{}/a.html", server.uri())).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.urls_seen, 2);
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/level1">down</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/level1",
        r#"<html><body><a href="/level2">down</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/level2",
        r#"<html><body><a href="/level3">down</a></body></html>"#,
    )
    .await;
    // Depth 3 is beyond max_depth=2 and must never be requested
    Mock::given(method("GET"))
        .and(path("/level3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 2, 4);
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    // Pages at depth == max_depth are still fetched, just not expanded
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.max_depth_reached, 2);
}

#[tokio::test]
async fn test_non_html_skipped_and_not_stored() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/data.json">data</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"k":"v"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 2, 2);
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.pages_skipped, 1);
    assert_eq!(summary.pages_failed, 0);
    assert!(!dir.path().join("data.json").exists());
}

#[tokio::test]
async fn test_scope_filter_restricts_links() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/keep.html">keep</a>
            <a href="/drop.png">drop</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/keep.html", "<html><body>kept</body></html>").await;
    Mock::given(method("GET"))
        .and(path("/drop.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path().to_str().unwrap(), 2, 2);
    config.crawler.scope_filter = Some(".html".to_string());
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.urls_seen, 2);
}

#[tokio::test]
async fn test_crawl_terminates_when_every_fetch_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 3, 4);
    let summary = run_crawl(config, &format!("{}/", server.uri())).await;

    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.pages_failed, 1);
}

#[tokio::test]
async fn test_cancellation_stops_dispatch() {
    let server = MockServer::start().await;

    // A wide site with slow pages: the crawl cannot finish quickly
    let links: String = (0..30)
        .map(|i| format!(r#"<a href="/slow{}">s{}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("<html><body>{}</body></html>", links), "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>slow</body></html>", "text/html")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap(), 3, 1);
    let seed = Url::parse(&format!("{}/", server.uri())).unwrap();
    let coordinator = Coordinator::new(config, seed).unwrap();
    let cancel = coordinator.cancel_token();

    let handle = tokio::spawn(coordinator.run());
    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();

    let summary = handle.await.unwrap().expect("Crawl failed");

    // The crawl stopped early but still produced a summary
    assert!(summary.pages_fetched >= 1);
    assert!(
        summary.pages_fetched < 31,
        "cancellation did not stop dispatch: {} pages fetched",
        summary.pages_fetched
    );
}
