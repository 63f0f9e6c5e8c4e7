//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! robots → sitemap traversal → export cycle end-to-end.

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_harvester::config::{Config, DomainEntry, IndexPolicy};
use sitemap_harvester::crawler::{harvest, Harvester};
use sitemap_harvester::output::{CsvExporter, DomainOutcome};
use sitemap_harvester::renderer::{DisabledRenderer, RenderSession, Renderer};
use sitemap_harvester::{FetchStrategy, HarvestError, SitemapState};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renderer that serves canned documents and records every URL it loads
#[derive(Clone, Default)]
struct FakeRenderer {
    pages: Arc<HashMap<String, String>>,
    rendered: Arc<Mutex<Vec<String>>>,
}

struct FakeSession {
    pages: Arc<HashMap<String, String>>,
    rendered: Arc<Mutex<Vec<String>>>,
    current: Option<String>,
}

impl FakeRenderer {
    fn with_pages(pages: Vec<(String, String)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            rendered: Arc::default(),
        }
    }

    fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError> {
        Ok(Box::new(FakeSession {
            pages: Arc::clone(&self.pages),
            rendered: Arc::clone(&self.rendered),
            current: None,
        }))
    }
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.rendered.lock().unwrap().push(url.to_string());
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn content(&mut self) -> Result<String, HarvestError> {
        let url = self.current.clone().unwrap_or_default();
        self.pages
            .get(&url)
            .cloned()
            .ok_or(HarvestError::Render {
                url,
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
    }

    async fn release(self: Box<Self>) -> Result<(), HarvestError> {
        Ok(())
    }
}

/// Creates a test configuration for the given sites
fn create_test_config(sites: &[&str], output_dir: &str) -> Config {
    let mut config = Config::with_domains(sites.iter().map(|s| DomainEntry::new(*s)).collect());
    config.crawler.fetch_timeout_secs = 5;
    config.browser.settle_time_ms = 0;
    config.browser.page_timeout_secs = 5;
    config.output.directory = output_dir.to_string();
    config
}

fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc><changefreq>daily</changefreq></url>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn index(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<sitemap><loc>{}</loc></sitemap>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

async fn mount_body(server: &MockServer, at: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn read_export(path: &std::path::Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).expect("export should exist");
    assert_eq!(reader.headers().unwrap().get(0), Some("Product Link"));
    reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect()
}

#[tokio::test]
async fn test_full_harvest_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!(
            "User-agent: *\nDisallow: /checkout\nSitemap: {}/sitemap_index.xml\n",
            base_url
        ),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap_index.xml",
        index(&[
            format!("{}/sitemap-products.xml", base_url),
            format!("{}/sitemap-pages.xml", base_url),
        ]),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap-products.xml",
        urlset(&[
            format!("{}/products/shirt-123", base_url),
            format!("{}/products/hat-9", base_url),
            format!("{}/products/banner.png", base_url),
        ]),
        1,
    )
    .await;
    // Not a product sitemap and a named sibling exists, so it is never fetched
    mount_body(
        &mock_server,
        "/sitemap-pages.xml",
        urlset(&[format!("{}/products/never", base_url)]),
        0,
    )
    .await;

    let config = create_test_config(&[&base_url], out.path().to_str().unwrap());
    let summary = harvest(config).await.expect("harvester should start");

    assert_eq!(summary.domains.len(), 1);
    match &summary.domains[0].outcome {
        DomainOutcome::Completed { links, export } => {
            assert_eq!(*links, 2);
            assert_eq!(
                read_export(export),
                vec![
                    format!("{}/products/shirt-123", base_url),
                    format!("{}/products/hat-9", base_url),
                ]
            );
        }
        other => panic!("Expected completed outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cyclic_indexes_terminate() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/products-a.xml\n", base_url),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/products-a.xml",
        index(&[
            format!("{}/products-b.xml", base_url),
            format!("{}/products-a.xml", base_url),
        ]),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/products-b.xml",
        index(&[
            format!("{}/products-a.xml", base_url),
            format!("{}/products-c.xml", base_url),
        ]),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/products-c.xml",
        urlset(&[format!("{}/p/42", base_url)]),
        1,
    )
    .await;

    let config = create_test_config(&[&base_url], ".");
    let mut harvester = Harvester::new(config, Arc::new(DisabledRenderer)).unwrap();
    let report = harvester
        .crawl(&DomainEntry::new(base_url.clone()))
        .await
        .unwrap();

    assert_eq!(report.indexes, 2);
    assert_eq!(report.terminals, 1);
    assert_eq!(report.links.len(), 1);
}

#[tokio::test]
async fn test_forbidden_switches_domain_to_rendered() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml\n", base_url),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access denied"))
        .expect(1)
        .mount(&mock_server)
        .await;
    // Once blocked, the domain is never fetched over plain HTTP again
    mount_body(&mock_server, "/sitemap_products_1.xml", urlset(&[]), 0).await;

    let index_url = format!("{}/sitemap.xml", base_url);
    let child_url = format!("{}/sitemap_products_1.xml", base_url);
    let renderer = FakeRenderer::with_pages(vec![
        (index_url.clone(), index(&[child_url.clone()])),
        (
            child_url.clone(),
            format!(
                "<html><head></head><body>{}</body></html>",
                urlset(&[format!("{}/products/rendered-1", base_url)])
                    .replace(r#"<?xml version="1.0" encoding="UTF-8"?>"#, "")
            ),
        ),
    ]);

    let config = create_test_config(&[&base_url], ".");
    let mut harvester = Harvester::new(config, Arc::new(renderer.clone())).unwrap();
    let report = harvester
        .crawl(&DomainEntry::new(base_url.clone()))
        .await
        .unwrap();

    assert_eq!(renderer.rendered(), vec![index_url.clone(), child_url.clone()]);
    assert_eq!(report.strategy, FetchStrategy::Rendered);
    assert_eq!(
        report.links.iter().collect::<Vec<_>>(),
        vec![format!("{}/products/rendered-1", base_url).as_str()]
    );
    assert_eq!(report.sitemap_state(&child_url), Some(SitemapState::ClassifiedTerminal));

    let key = url::Url::parse(&base_url).unwrap();
    let key = format!("{}:{}", key.host_str().unwrap(), key.port().unwrap());
    let state = harvester.domain_states().get(&key).unwrap();
    assert!(state.is_blocked());
    assert_eq!(state.plain_requests, 2);
    assert_eq!(state.rendered_requests, 2);
}

#[tokio::test]
async fn test_rendered_robots_is_unwrapped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let robots_url = format!("{}/robots.txt", base_url);
    let sitemap_url = format!("{}/sitemap.xml", base_url);
    let renderer = FakeRenderer::with_pages(vec![
        (
            robots_url,
            format!(
                "<html><head></head><body><pre style=\"word-wrap: break-word;\">User-agent: *\nSitemap: {}\n</pre></body></html>",
                sitemap_url
            ),
        ),
        (
            sitemap_url.clone(),
            urlset(&[format!("{}/item/lamp", base_url)]),
        ),
    ]);

    let config = create_test_config(&[&base_url], ".");
    let mut harvester = Harvester::new(config, Arc::new(renderer.clone())).unwrap();
    let report = harvester
        .crawl(&DomainEntry::new(base_url.clone()))
        .await
        .unwrap();

    assert_eq!(report.sitemaps_declared, 1);
    assert_eq!(report.links.len(), 1);
    assert_eq!(renderer.rendered().len(), 2);
}

#[tokio::test]
async fn test_gzip_sitemap_matches_plain() {
    let plain_server = MockServer::start().await;
    let gzip_server = MockServer::start().await;

    let products = |base: &str| {
        urlset(&[
            format!("{}/products/a", base),
            format!("{}/products/b", base),
            format!("{}/about", base),
        ])
    };

    mount_body(
        &plain_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml\n", plain_server.uri()),
        1,
    )
    .await;
    mount_body(&plain_server, "/sitemap.xml", products(&plain_server.uri()), 1).await;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(products(&gzip_server.uri()).as_bytes())
        .unwrap();
    let compressed = encoder.finish().unwrap();

    mount_body(
        &gzip_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml.gz\n", gzip_server.uri()),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-gzip")
                .set_body_bytes(compressed),
        )
        .expect(1)
        .mount(&gzip_server)
        .await;

    let config = create_test_config(&[], ".");
    let mut harvester = Harvester::new(config, Arc::new(DisabledRenderer)).unwrap();

    let plain = harvester
        .crawl(&DomainEntry::new(plain_server.uri()))
        .await
        .unwrap();
    let packed = harvester
        .crawl(&DomainEntry::new(gzip_server.uri()))
        .await
        .unwrap();

    let paths = |links: Vec<&str>| -> Vec<String> {
        links
            .into_iter()
            .map(|l| url::Url::parse(l).unwrap().path().to_string())
            .collect()
    };
    assert_eq!(
        paths(plain.links.iter().collect()),
        paths(packed.links.iter().collect())
    );
    assert_eq!(packed.links.len(), 2);
}

#[tokio::test]
async fn test_domain_failures_do_not_stop_run() {
    let blocked = MockServer::start().await;
    let healthy = MockServer::start().await;
    let empty = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Blocked and no browser available: fatal for this domain only
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&blocked)
        .await;

    mount_body(
        &healthy,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml\n", healthy.uri()),
        1,
    )
    .await;
    mount_body(
        &healthy,
        "/sitemap.xml",
        urlset(&[format!("{}/product/kettle", healthy.uri())]),
        1,
    )
    .await;

    mount_body(&empty, "/robots.txt", "User-agent: *\nAllow: /\n".to_string(), 1).await;

    let blocked_uri = blocked.uri();
    let healthy_uri = healthy.uri();
    let empty_uri = empty.uri();
    let mut config = create_test_config(
        &[&blocked_uri, &healthy_uri, &empty_uri],
        out.path().to_str().unwrap(),
    );
    config.browser.enabled = false;

    let summary = harvest(config).await.unwrap();

    assert_eq!(summary.domains.len(), 3);
    assert!(matches!(
        summary.domains[0].outcome,
        DomainOutcome::Aborted { .. }
    ));
    assert_eq!(summary.domains[1].outcome.link_count(), 1);
    match &summary.domains[2].outcome {
        DomainOutcome::Completed { links: 0, export } => {
            assert!(read_export(export).is_empty());
        }
        other => panic!("Expected empty completion, got {:?}", other),
    }
    assert_eq!(summary.aborted(), 1);
    assert_eq!(summary.empty(), 1);
}

#[tokio::test]
async fn test_exhaustive_policy_follows_every_child() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml\n", base_url),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap.xml",
        index(&[
            format!("{}/sitemap-products.xml", base_url),
            format!("{}/sitemap-blog.xml", base_url),
        ]),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap-products.xml",
        urlset(&[format!("{}/products/a", base_url)]),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap-blog.xml",
        urlset(&[format!("{}/shop/gift-card", base_url)]),
        1,
    )
    .await;

    let mut config = create_test_config(&[&base_url], ".");
    config.crawler.index_policy = IndexPolicy::Exhaustive;
    let mut harvester = Harvester::new(config, Arc::new(DisabledRenderer)).unwrap();
    let report = harvester
        .crawl(&DomainEntry::new(base_url.clone()))
        .await
        .unwrap();

    assert_eq!(report.terminals, 2);
    assert_eq!(report.links.len(), 2);
}

#[tokio::test]
async fn test_domain_product_pattern_override() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap.xml\n", base_url),
        1,
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap.xml",
        urlset(&[
            format!("{}/dp/B0001", base_url),
            format!("{}/products/ignored", base_url),
        ]),
        1,
    )
    .await;

    let config = create_test_config(&[], ".");
    let mut harvester = Harvester::new(config, Arc::new(DisabledRenderer)).unwrap();
    let entry = DomainEntry {
        site: base_url.clone(),
        product_patterns: Some(vec!["/dp/".to_string()]),
    };
    let report = harvester.crawl(&entry).await.unwrap();

    assert_eq!(
        report.links.iter().collect::<Vec<_>>(),
        vec![format!("{}/dp/B0001", base_url).as_str()]
    );
}
