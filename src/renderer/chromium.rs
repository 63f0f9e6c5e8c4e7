//! Chromium-backed renderer using chromiumoxide.

use super::{RenderSession, Renderer};
use crate::config::{BrowserConfig, FetchConfig};
use crate::HarvestError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::OnceCell;

/// Headless Chromium, launched on first use
///
/// Most runs never hit a 403, so the browser process is only started when the first
/// blocked domain needs it. A launch failure is reported as `BrowserUnavailable` and
/// retried on the next acquire.
pub struct ChromiumRenderer {
    browser: OnceCell<Browser>,
    executable: Option<String>,
    user_agent: String,
    extra_args: Vec<String>,
}

impl ChromiumRenderer {
    pub fn new(browser: &BrowserConfig, fetch: &FetchConfig) -> Self {
        Self {
            browser: OnceCell::new(),
            executable: browser.chrome_executable.clone(),
            user_agent: fetch.user_agent.clone(),
            extra_args: browser.extra_args.clone(),
        }
    }

    async fn launch(&self) -> Result<Browser, HarvestError> {
        let mut builder = LaunchConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--window-size=1920,1080")
            .arg(format!("--user-agent={}", self.user_agent));

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        for arg in &self.extra_args {
            builder = builder.arg(arg.clone());
        }

        let config = builder
            .build()
            .map_err(|e| HarvestError::BrowserUnavailable(format!("bad browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HarvestError::BrowserUnavailable(format!("launch failed: {}", e)))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Launched headless browser for rendered fetches");
        Ok(browser)
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError> {
        let browser = self.browser.get_or_try_init(|| self.launch()).await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::BrowserUnavailable(format!("cannot open tab: {}", e)))?;

        Ok(Box::new(ChromiumSession { page }))
    }
}

/// One Chromium tab
struct ChromiumSession {
    page: Page,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        let render_error = |e: chromiumoxide::error::CdpError| HarvestError::Render {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.page.goto(url).await.map_err(render_error)?;
        self.page.wait_for_navigation().await.map_err(render_error)?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, HarvestError> {
        self.page.content().await.map_err(|e| HarvestError::Render {
            url: "current page".to_string(),
            message: e.to_string(),
        })
    }

    async fn release(self: Box<Self>) -> Result<(), HarvestError> {
        self.page.close().await.map_err(|e| HarvestError::Render {
            url: "about:blank".to_string(),
            message: format!("close failed: {}", e),
        })
    }
}
