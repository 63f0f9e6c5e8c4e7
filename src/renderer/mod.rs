//! Browser rendering capability for blocked domains
//!
//! The fetcher never talks to a browser engine directly. It is handed a `Renderer`,
//! which hands out `RenderSession`s (one browser tab each). `render_with` is the only
//! way the crate uses a session: it acquires one, loads the URL, waits for the page
//! to settle, reads the document back and releases the tab on every exit path.

mod chromium;

pub use chromium::ChromiumRenderer;

use crate::HarvestError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// A browser engine that can open rendering sessions
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a new session (tab). Fails with `BrowserUnavailable` if the engine
    /// cannot be started at all.
    async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError>;
}

/// A single browser tab
#[async_trait]
pub trait RenderSession: Send {
    /// Navigates to `url` and waits for the navigation to finish
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError>;

    /// Returns the current document's serialized markup
    async fn content(&mut self) -> Result<String, HarvestError>;

    /// Closes the tab
    async fn release(self: Box<Self>) -> Result<(), HarvestError>;
}

/// Loads `url` in a fresh session and returns the rendered document
///
/// Opening the tab and loading the page are each bounded by `timeout`. The session
/// is released whether the load succeeds, fails or times out. A release failure is
/// logged; it never hides the load result.
pub async fn render_with(
    renderer: &dyn Renderer,
    url: &Url,
    timeout: Duration,
    settle: Duration,
) -> Result<String, HarvestError> {
    let mut session = match tokio::time::timeout(timeout, renderer.acquire()).await {
        Ok(acquired) => acquired?,
        Err(_) => {
            tracing::warn!("Timed out opening a browser session for {}", url);
            return Err(HarvestError::Timeout {
                url: url.to_string(),
            });
        }
    };

    let loaded = tokio::time::timeout(timeout, async {
        session.navigate(url.as_str()).await?;
        tokio::time::sleep(settle).await;
        session.content().await
    })
    .await;

    if let Err(e) = session.release().await {
        tracing::warn!("Failed to release browser session for {}: {}", url, e);
    }

    match loaded {
        Ok(result) => result,
        Err(_) => Err(HarvestError::Timeout {
            url: url.to_string(),
        }),
    }
}

/// Renderer used when the browser fallback is switched off
///
/// Every acquire fails with `BrowserUnavailable`, so a blocked domain aborts instead
/// of silently yielding nothing.
pub struct DisabledRenderer;

#[async_trait]
impl Renderer for DisabledRenderer {
    async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError> {
        Err(HarvestError::BrowserUnavailable(
            "browser fallback is disabled".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts acquired and released sessions
    struct CountingRenderer {
        acquired: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
        fail_navigation: bool,
        hang: bool,
    }

    struct CountingSession {
        released: Arc<AtomicUsize>,
        fail_navigation: bool,
        hang: bool,
    }

    #[async_trait]
    impl Renderer for CountingRenderer {
        async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                released: Arc::clone(&self.released),
                fail_navigation: self.fail_navigation,
                hang: self.hang,
            }))
        }
    }

    #[async_trait]
    impl RenderSession for CountingSession {
        async fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
            if self.hang {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.fail_navigation {
                return Err(HarvestError::Render {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_RESET".to_string(),
                });
            }
            Ok(())
        }

        async fn content(&mut self) -> Result<String, HarvestError> {
            Ok("<urlset></urlset>".to_string())
        }

        async fn release(self: Box<Self>) -> Result<(), HarvestError> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn renderer(fail_navigation: bool, hang: bool) -> CountingRenderer {
        CountingRenderer {
            acquired: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
            fail_navigation,
            hang,
        }
    }

    fn url() -> Url {
        Url::parse("https://shop.com/sitemap.xml").unwrap()
    }

    #[tokio::test]
    async fn test_session_released_after_success() {
        let r = renderer(false, false);
        let body = render_with(&r, &url(), Duration::from_secs(5), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(body, "<urlset></urlset>");
        assert_eq!(r.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(r.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_released_after_error() {
        let r = renderer(true, false);
        let result = render_with(&r, &url(), Duration::from_secs(5), Duration::ZERO).await;

        assert!(matches!(result, Err(HarvestError::Render { .. })));
        assert_eq!(r.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_released_after_timeout() {
        let r = renderer(false, true);
        let result =
            render_with(&r, &url(), Duration::from_millis(50), Duration::ZERO).await;

        assert!(matches!(result, Err(HarvestError::Timeout { .. })));
        assert_eq!(r.released.load(Ordering::SeqCst), 1);
    }

    /// Never manages to open a tab
    struct StalledRenderer;

    #[async_trait]
    impl Renderer for StalledRenderer {
        async fn acquire(&self) -> Result<Box<dyn RenderSession>, HarvestError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(HarvestError::BrowserUnavailable("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_stalled_acquire_times_out() {
        let result =
            render_with(&StalledRenderer, &url(), Duration::from_millis(50), Duration::ZERO).await;

        match result {
            Err(HarvestError::Timeout { url }) => assert_eq!(url, "https://shop.com/sitemap.xml"),
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_disabled_renderer_is_unavailable() {
        let result =
            render_with(&DisabledRenderer, &url(), Duration::from_secs(1), Duration::ZERO).await;

        match result {
            Err(e) => assert!(e.is_fatal()),
            Ok(_) => panic!("disabled renderer must not render"),
        }
    }
}
