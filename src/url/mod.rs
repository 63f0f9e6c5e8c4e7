//! URL handling module for Sitemap Harvester
//!
//! This module provides site identity (`Domain`), sitemap location normalization,
//! host extraction and wildcard host matching.

mod domain;
mod matcher;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_same_site, strip_www};
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

/// A site under harvest
///
/// Built from a configured site string, which may be a bare hostname
/// (`shop.example.com`) or an origin URL (`https://www.example.com`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    origin: Url,
    host: String,
}

impl Domain {
    /// Parses a configured site string
    ///
    /// Bare hostnames are assumed to be served over HTTPS. Any path, query or
    /// fragment on the input is discarded; only the origin is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_harvester::url::Domain;
    ///
    /// let domain = Domain::parse("https://WWW.Example.com/shop?x=1").unwrap();
    /// assert_eq!(domain.host(), "www.example.com");
    /// assert_eq!(domain.origin().as_str(), "https://www.example.com/");
    /// assert_eq!(domain.export_stem(), "example.com");
    ///
    /// let bare = Domain::parse("shop.example.org").unwrap();
    /// assert_eq!(bare.origin().as_str(), "https://shop.example.org/");
    /// ```
    pub fn parse(site: &str) -> UrlResult<Self> {
        let trimmed = site.trim();
        if trimmed.is_empty() {
            return Err(UrlError::MissingDomain);
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let mut origin = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

        if origin.scheme() != "http" && origin.scheme() != "https" {
            return Err(UrlError::InvalidScheme(origin.scheme().to_string()));
        }

        let host = extract_domain(&origin).ok_or(UrlError::MissingDomain)?;

        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);

        Ok(Self { origin, host })
    }

    /// Lowercase hostname, without port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Origin URL (scheme, host, port and a root path)
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Key used for per-domain fetch state: host plus any non-default port
    pub fn key(&self) -> String {
        match self.origin.port() {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }

    /// Location of the site's robots.txt
    pub fn robots_url(&self) -> Url {
        let mut url = self.origin.clone();
        url.set_path("/robots.txt");
        url
    }

    /// File-name-safe site label used for exports (`www.` stripped)
    pub fn export_stem(&self) -> String {
        let host = strip_www(&self.host);
        match self.origin.port() {
            Some(port) => format!("{}_{}", host, port),
            None => host.to_string(),
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
