use serde::Deserialize;

/// Main configuration structure for Sitemap Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub sitemaps: SitemapConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "domain")]
    pub domains: Vec<DomainEntry>,
}

impl Config {
    /// Builds a configuration with default settings for the given sites
    pub fn with_domains(domains: Vec<DomainEntry>) -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            fetch: FetchConfig::default(),
            browser: BrowserConfig::default(),
            sitemaps: SitemapConfig::default(),
            filter: FilterConfig::default(),
            output: OutputConfig::default(),
            domains,
        }
    }
}

/// How child references of a sitemap index are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Follow children whose name matches a product-sitemap pattern. Children with
    /// no naming signal are followed only when no sibling matches.
    Fallback,
    /// Follow only children whose name matches a product-sitemap pattern
    Named,
    /// Follow every child reference
    Exhaustive,
}

impl Default for IndexPolicy {
    fn default() -> Self {
        Self::Fallback
    }
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Per-request timeout for plain HTTP fetches (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Maximum nesting of sitemap indexes below a robots.txt entry
    #[serde(rename = "max-sitemap-depth", default = "default_max_depth")]
    pub max_sitemap_depth: u32,

    #[serde(rename = "index-policy", default)]
    pub index_policy: IndexPolicy,

    /// Ignore robots.txt sitemap directives that don't end in .xml or .xml.gz
    #[serde(rename = "xml-sitemaps-only", default = "default_true")]
    pub xml_sitemaps_only: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout(),
            max_sitemap_depth: default_max_depth(),
            index_policy: IndexPolicy::default(),
            xml_sitemaps_only: true,
        }
    }
}

/// Request header configuration for the plain HTTP path
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

/// Headless browser configuration for blocked domains
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// When false, a blocked domain aborts instead of switching to the browser
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(rename = "chrome-executable", default)]
    pub chrome_executable: Option<String>,

    /// Time to let a page settle after navigation (milliseconds)
    #[serde(rename = "settle-time-ms", default = "default_settle_time")]
    pub settle_time_ms: u64,

    /// Upper bound for a whole rendered load (seconds)
    #[serde(rename = "page-timeout-secs", default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    #[serde(rename = "extra-args", default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chrome_executable: None,
            settle_time_ms: default_settle_time(),
            page_timeout_secs: default_page_timeout(),
            extra_args: Vec::new(),
        }
    }
}

/// Sitemap naming heuristics used when descending into indexes
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    /// Substrings that mark a child sitemap as holding products
    #[serde(rename = "product-patterns", default = "default_sitemap_patterns")]
    pub product_patterns: Vec<String>,

    /// Substrings that mark a child sitemap as certainly not holding products
    #[serde(rename = "excluded-patterns", default = "default_sitemap_exclusions")]
    pub excluded_patterns: Vec<String>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            product_patterns: default_sitemap_patterns(),
            excluded_patterns: default_sitemap_exclusions(),
        }
    }
}

/// Product link filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Path fragments that identify a product page
    #[serde(rename = "product-patterns", default = "default_product_patterns")]
    pub product_patterns: Vec<String>,

    /// Path suffixes of static assets (always rejected)
    #[serde(rename = "asset-extensions", default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,

    /// Path fragments that disqualify an otherwise matching URL
    #[serde(rename = "excluded-patterns", default = "default_link_exclusions")]
    pub excluded_patterns: Vec<String>,

    /// Asset/CDN hosts whose links are never products (supports "*.host")
    #[serde(rename = "ignored-hosts", default = "default_ignored_hosts")]
    pub ignored_hosts: Vec<String>,

    /// Only accept links on the crawled site or its subdomains
    #[serde(rename = "same-host-only", default = "default_true")]
    pub same_host_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            product_patterns: default_product_patterns(),
            asset_extensions: default_asset_extensions(),
            excluded_patterns: default_link_exclusions(),
            ignored_hosts: default_ignored_hosts(),
            same_host_only: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `<site>_products.csv` per domain
    #[serde(default = "default_output_dir")]
    pub directory: String,

    /// Optional markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            summary_path: None,
        }
    }
}

/// A site to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntry {
    /// Hostname ("shop.example.com") or origin URL ("https://www.example.com")
    pub site: String,

    /// Replaces `[filter].product-patterns` for this site only
    #[serde(rename = "product-patterns", default)]
    pub product_patterns: Option<Vec<String>>,
}

impl DomainEntry {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            product_patterns: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_depth() -> u32 {
    8
}

fn default_settle_time() -> u64 {
    3000
}

fn default_page_timeout() -> u64 {
    30
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/119.0.0.0 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn default_sitemap_patterns() -> Vec<String> {
    strings(&[
        "sitemap-product",
        "product-sitemap",
        "sitemap_products",
        "products",
        "inventory",
        "sitemap-v2",
        "sitemap/pdp",
        "sitemaps/prod",
        "prod-",
        "category-sitemap",
    ])
}

fn default_sitemap_exclusions() -> Vec<String> {
    strings(&[
        "blog",
        "post",
        "page-sitemap",
        "image",
        "video",
        "news",
        "author",
        "tag",
    ])
}

fn default_product_patterns() -> Vec<String> {
    strings(&["/product/", "/products/", "/p/", "/item/", "/shop/", "/details/"])
}

fn default_asset_extensions() -> Vec<String> {
    strings(&[
        ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".woff",
        ".woff2", ".ttf", ".otf", ".eot", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ])
}

fn default_link_exclusions() -> Vec<String> {
    strings(&["collection", "category", "blog"])
}

fn default_ignored_hosts() -> Vec<String> {
    strings(&[
        "cdn.shopify.com",
        "images.ctfassets.net",
        "assets.adobedtm.com",
    ])
}
