//! Sitemap Harvester: product-link discovery through sitemap hierarchies
//!
//! This crate walks an e-commerce site's sitemaps, starting from the `Sitemap:`
//! directives in its robots.txt, and collects the URLs that look like product pages.
//! Plain HTTP is used until a site answers 403, after which that site is fetched
//! through a headless browser for the rest of the run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod renderer;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for harvesting operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not found: {url} ({reason})")]
    NotFound { url: String, reason: String },

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },

    #[error("Sitemap parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("Rendered fetch failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SitemapState,
        to: state::SitemapState,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true if this error must abort the current domain's crawl.
    ///
    /// Everything else is recovered locally: the affected reference is skipped and
    /// its siblings are still processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BrowserUnavailable(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for harvesting operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Harvester, ProductFilter, SitemapDocument};
pub use state::{DomainState, FetchStrategy, SitemapState};
pub use url::{normalize_url, Domain};
