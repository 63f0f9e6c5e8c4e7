//! HTTP fetcher implementation
//!
//! This module handles every request the harvester makes, including:
//! - Building an HTTP client that presents browser-like headers
//! - Plain GET requests for robots.txt and sitemap documents
//! - Switching a domain to rendered fetching after its first 403
//! - Error classification

use crate::config::{BrowserConfig, Config, FetchConfig};
use crate::renderer::{render_with, Renderer};
use crate::state::{DomainState, FetchStrategy};
use crate::{ConfigError, HarvestError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Raw response body (rendered markup for the browser path)
    pub body: Vec<u8>,

    /// Strategy that produced the body
    pub strategy: FetchStrategy,
}

/// Outcome of a plain request that reached the server
enum PlainResponse {
    Body(Vec<u8>),
    Denied,
}

/// Builds an HTTP client that looks like a regular browser
///
/// # Arguments
///
/// * `config` - Header values to present
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - A header value was invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use sitemap_harvester::config::FetchConfig;
/// use sitemap_harvester::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&FetchConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig, timeout: Duration) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).map_err(|e| {
            ConfigError::Validation(format!("fetch.accept-language is not a valid header: {}", e))
        })?,
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches documents for every domain in a run
///
/// The fetcher holds no per-domain state of its own. Callers pass the domain's
/// `DomainState`, which decides the strategy and records the 403 switch.
pub struct Fetcher {
    client: Client,
    renderer: Arc<dyn Renderer>,
    page_timeout: Duration,
    settle_time: Duration,
}

impl Fetcher {
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self, HarvestError> {
        let timeout = Duration::from_secs(config.crawler.fetch_timeout_secs);
        let client = build_http_client(&config.fetch, timeout)?;
        Ok(Self::with_client(client, &config.browser, renderer))
    }

    pub fn with_client(client: Client, browser: &BrowserConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            client,
            renderer,
            page_timeout: Duration::from_secs(browser.page_timeout_secs),
            settle_time: Duration::from_millis(browser.settle_time_ms),
        }
    }

    /// Fetches `url` using the domain's current strategy
    ///
    /// # Request Flow
    ///
    /// | Strategy | Response | Action |
    /// |----------|----------|--------|
    /// | Plain | 2xx, non-empty | Return body |
    /// | Plain | 403 | Mark domain blocked, retry this URL rendered |
    /// | Plain | 404 / 410 | `NotFound` |
    /// | Plain | other status | `HttpStatus` |
    /// | Plain | timeout | `Timeout` |
    /// | Plain | connect / other | `Fetch` |
    /// | Rendered | any | Load through the renderer |
    ///
    /// An empty body is an `EmptyBody` error on either path.
    pub async fn fetch(&self, url: &Url, state: &mut DomainState) -> Result<Fetched, HarvestError> {
        if state.strategy() == FetchStrategy::Rendered {
            return self.fetch_rendered(url, state).await;
        }

        state.record_request(FetchStrategy::Plain);
        match self.fetch_plain(url).await? {
            PlainResponse::Body(body) => Ok(Fetched {
                body,
                strategy: FetchStrategy::Plain,
            }),
            PlainResponse::Denied => {
                if state.mark_blocked() {
                    tracing::warn!(
                        "{} answered 403, switching to rendered fetching",
                        url.host_str().unwrap_or("domain")
                    );
                }
                self.fetch_rendered(url, state).await
            }
        }
    }

    async fn fetch_plain(&self, url: &Url) -> Result<PlainResponse, HarvestError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Ok(PlainResponse::Denied);
        }
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(HarvestError::NotFound {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        if body.is_empty() {
            return Err(HarvestError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(PlainResponse::Body(body.to_vec()))
    }

    async fn fetch_rendered(
        &self,
        url: &Url,
        state: &mut DomainState,
    ) -> Result<Fetched, HarvestError> {
        tracing::debug!("Rendering {}", url);
        state.record_request(FetchStrategy::Rendered);

        let markup = render_with(
            self.renderer.as_ref(),
            url,
            self.page_timeout,
            self.settle_time,
        )
        .await?;

        if markup.trim().is_empty() {
            return Err(HarvestError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(Fetched {
            body: markup.into_bytes(),
            strategy: FetchStrategy::Rendered,
        })
    }
}

fn classify_request_error(url: &Url, e: reqwest::Error) -> HarvestError {
    if e.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        HarvestError::Fetch {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        }
    } else {
        HarvestError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
