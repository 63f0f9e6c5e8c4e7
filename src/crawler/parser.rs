//! Parser for browser-rendered documents
//!
//! When a domain is fetched through the browser, the body we get back is the page's
//! serialized DOM rather than the raw response. This module handles:
//! - Sitemaps that came back wrapped in an HTML document
//! - Plain-text resources (robots.txt) that the browser wrapped in `<pre>`

use scraper::{Html, Selector};

/// Root element found in a rendered sitemap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedRoot {
    Index,
    Urlset,
}

/// Location entries recovered from a rendered sitemap
#[derive(Debug, Clone)]
pub struct RenderedSitemap {
    pub root: RenderedRoot,

    /// Raw `<loc>` text in document order, trimmed, empties removed
    pub locations: Vec<String>,
}

/// Recovers sitemap entries from an HTML-wrapped sitemap
///
/// A `<sitemapindex>` anywhere in the document wins over a `<urlset>`. Only `<loc>`
/// elements that are direct children of `<sitemap>` or `<url>` entries count, so
/// extension tags such as `<image:loc>` are ignored.
///
/// # Returns
///
/// * `Some(RenderedSitemap)` - The document contains a sitemap root
/// * `None` - No sitemap root was found
///
/// # Example
///
/// ```
/// use sitemap_harvester::crawler::{parse_rendered_sitemap, RenderedRoot};
///
/// let html = "<html><body><urlset><url><loc>https://x.com/p/1</loc></url></urlset></body></html>";
/// let parsed = parse_rendered_sitemap(html).unwrap();
/// assert_eq!(parsed.root, RenderedRoot::Urlset);
/// assert_eq!(parsed.locations, vec!["https://x.com/p/1".to_string()]);
/// ```
pub fn parse_rendered_sitemap(markup: &str) -> Option<RenderedSitemap> {
    let document = Html::parse_document(markup);

    let index_root = Selector::parse("sitemapindex").ok()?;
    let urlset_root = Selector::parse("urlset").ok()?;

    let (root, entry_selector) = if document.select(&index_root).next().is_some() {
        (RenderedRoot::Index, "sitemapindex sitemap > loc")
    } else if document.select(&urlset_root).next().is_some() {
        (RenderedRoot::Urlset, "urlset url > loc")
    } else {
        return None;
    };

    let selector = Selector::parse(entry_selector).ok()?;
    let locations = document
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect();

    Some(RenderedSitemap { root, locations })
}

/// Unwraps a plain-text resource from its rendered HTML wrapper
///
/// Browsers display text responses inside `<pre>`. If `markup` looks like an HTML
/// document, the text of its first `<pre>` (or of the body if there is none) is
/// returned; anything else is returned unchanged.
pub fn extract_rendered_text(markup: &str) -> String {
    let head = markup.trim_start();
    let looks_like_html = head.starts_with('<')
        && head
            .get(..head.len().min(512))
            .map(|start| start.to_ascii_lowercase().contains("<html"))
            .unwrap_or(false);

    if !looks_like_html {
        return markup.to_string();
    }

    let document = Html::parse_document(markup);
    for candidate in ["pre", "body"] {
        if let Ok(selector) = Selector::parse(candidate) {
            if let Some(element) = document.select(&selector).next() {
                return element.text().collect();
            }
        }
    }

    String::new()
}
