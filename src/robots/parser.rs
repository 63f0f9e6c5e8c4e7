//! Robots.txt parser implementation
//!
//! This module extracts `Sitemap:` directives from robots.txt content using the
//! robotstxt crate's line parser. Allow/Disallow groups are parsed but not kept.

use crate::url::normalize_url;
use robotstxt::{parse_robotstxt, RobotsParseHandler};
use url::Url;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Sitemap directive values in file order, de-duplicated
    sitemaps: Vec<String>,
}

/// Collects sitemap directives while the robotstxt parser walks the file
#[derive(Default)]
struct SitemapCollector {
    sitemaps: Vec<String>,
}

impl RobotsParseHandler for SitemapCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, line_num: u32, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            tracing::debug!("Empty Sitemap directive on line {}", line_num);
            return;
        }
        if !self.sitemaps.iter().any(|s| s == value) {
            self.sitemaps.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Directive names are matched case-insensitively and comments are stripped.
    /// Lines that aren't directives are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_harvester::robots::ParsedRobots;
    ///
    /// let robots = ParsedRobots::from_content(
    ///     "User-agent: *\nDisallow: /cart\nsitemap: https://shop.com/sitemap.xml\n",
    /// );
    /// assert_eq!(robots.sitemaps(), ["https://shop.com/sitemap.xml"]);
    /// ```
    pub fn from_content(content: &str) -> Self {
        let mut collector = SitemapCollector::default();
        parse_robotstxt(content, &mut collector);

        Self {
            sitemaps: collector.sitemaps,
        }
    }

    /// Raw sitemap directive values in file order
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    /// Sitemap locations resolved against `base`
    ///
    /// Values that don't resolve to an HTTP(S) URL are dropped. With `xml_only`,
    /// locations whose path doesn't end in `.xml` or `.xml.gz` are dropped as well.
    /// The result keeps file order with duplicates removed after normalization.
    pub fn sitemap_urls(&self, base: &Url, xml_only: bool) -> Vec<Url> {
        let mut urls: Vec<Url> = Vec::new();

        for value in &self.sitemaps {
            let url = match normalize_url(value, base) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Ignoring sitemap directive {:?}: {}", value, e);
                    continue;
                }
            };

            if xml_only && !is_xml_sitemap(&url) {
                tracing::debug!("Ignoring non-XML sitemap {}", url);
                continue;
            }

            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        urls
    }
}

/// Returns true if the location's path ends in `.xml` or `.xml.gz`
pub fn is_xml_sitemap(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    path.ends_with(".xml") || path.ends_with(".xml.gz")
}
