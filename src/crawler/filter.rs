//! URL filters for the traversal
//!
//! Two decisions are made from URL text alone:
//! - `ProductFilter`: is this urlset entry a product page?
//! - `SitemapSelector`: which children of a sitemap index are worth fetching?

use crate::config::{CrawlerConfig, DomainEntry, FilterConfig, IndexPolicy, SitemapConfig};
use crate::url::{extract_domain, is_same_site, matches_wildcard, Domain};
use super::frontier::SitemapReference;
use url::Url;

/// Decides whether a candidate link is a product page
///
/// # Rules (first match wins)
///
/// 1. Host is on the ignored list (CDNs, tag managers) → reject
/// 2. Restricted to a site and the host is off-site → reject
/// 3. Path ends with a static-asset extension → reject
/// 4. Path contains no product pattern → reject
/// 5. Path contains an excluded pattern (collections, categories) → reject
/// 6. Otherwise → accept
///
/// Paths are compared lowercased. The product patterns form a mutable list so a
/// domain can replace or extend them.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    product_patterns: Vec<String>,
    asset_extensions: Vec<String>,
    excluded_patterns: Vec<String>,
    ignored_hosts: Vec<String>,
    site_host: Option<String>,
}

impl ProductFilter {
    /// Filter with the configured patterns and no site restriction
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            product_patterns: lowercase_all(&config.product_patterns),
            asset_extensions: lowercase_all(&config.asset_extensions),
            excluded_patterns: lowercase_all(&config.excluded_patterns),
            ignored_hosts: lowercase_all(&config.ignored_hosts),
            site_host: None,
        }
    }

    /// Filter for one configured domain
    ///
    /// Applies the domain's product-pattern override and, when `same-host-only` is
    /// set, restricts accepted links to the domain's site.
    pub fn for_domain(config: &FilterConfig, entry: &DomainEntry, domain: &Domain) -> Self {
        let mut filter = Self::from_config(config);
        if let Some(patterns) = &entry.product_patterns {
            filter.product_patterns = lowercase_all(patterns);
        }
        if config.same_host_only {
            filter = filter.restrict_to(domain.host());
        }
        filter
    }

    /// Only accept links on `host` (or its subdomains, `www.` ignored)
    pub fn restrict_to(mut self, host: &str) -> Self {
        self.site_host = Some(host.to_lowercase());
        self
    }

    pub fn product_patterns(&self) -> &[String] {
        &self.product_patterns
    }

    /// Mutable access to the product patterns
    ///
    /// Patterns added here should be lowercase; paths are lowercased before matching.
    pub fn product_patterns_mut(&mut self) -> &mut Vec<String> {
        &mut self.product_patterns
    }

    /// Returns true if `url` looks like a product page
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_harvester::config::FilterConfig;
    /// use sitemap_harvester::crawler::ProductFilter;
    /// use url::Url;
    ///
    /// let filter = ProductFilter::from_config(&FilterConfig::default());
    /// let check = |s: &str| filter.is_product_link(&Url::parse(s).unwrap());
    ///
    /// assert!(check("https://x.com/products/shirt-123"));
    /// assert!(!check("https://x.com/assets/logo.png"));
    /// assert!(!check("https://x.com/about-us"));
    /// ```
    pub fn is_product_link(&self, url: &Url) -> bool {
        let host = match extract_domain(url) {
            Some(host) => host,
            None => return false,
        };

        if self
            .ignored_hosts
            .iter()
            .any(|pattern| matches_wildcard(pattern, &host))
        {
            return false;
        }

        if let Some(site) = &self.site_host {
            if !is_same_site(&host, site) {
                return false;
            }
        }

        let path = url.path().to_lowercase();

        if self.asset_extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            return false;
        }

        if !self.product_patterns.iter().any(|p| path.contains(p.as_str())) {
            return false;
        }

        !self.excluded_patterns.iter().any(|p| path.contains(p.as_str()))
    }
}

/// Naming signal carried by a child sitemap's location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapSignal {
    /// Name suggests product listings
    Product,
    /// Name suggests non-product content (blog, images, tags)
    Excluded,
    /// Name says nothing either way
    Unknown,
}

/// Chooses which children of a sitemap index to enqueue
///
/// | Policy | Product | Unknown | Excluded |
/// |--------|---------|---------|----------|
/// | `named` | yes | no | no |
/// | `fallback` | yes | only if no sibling is Product | no |
/// | `exhaustive` | yes | yes | yes |
#[derive(Debug, Clone)]
pub struct SitemapSelector {
    policy: IndexPolicy,
    product_patterns: Vec<String>,
    excluded_patterns: Vec<String>,
}

impl SitemapSelector {
    pub fn new(crawler: &CrawlerConfig, sitemaps: &SitemapConfig) -> Self {
        Self {
            policy: crawler.index_policy,
            product_patterns: lowercase_all(&sitemaps.product_patterns),
            excluded_patterns: lowercase_all(&sitemaps.excluded_patterns),
        }
    }

    pub fn policy(&self) -> IndexPolicy {
        self.policy
    }

    /// Reads the naming signal from the location's path and query
    ///
    /// Product patterns match anywhere in the name. Excluded patterns must match
    /// whole name tokens (a trailing `s` allowed), so `sitemap-posts.xml` is excluded
    /// while `sitemap-posters.xml` and `sitemap-vintage.xml` are not. A product
    /// signal wins over an excluded one.
    pub fn signal(&self, url: &Url) -> SitemapSignal {
        let mut name = url.path().to_lowercase();
        if let Some(query) = url.query() {
            name.push('?');
            name.push_str(&query.to_lowercase());
        }

        if self.product_patterns.iter().any(|p| name.contains(p.as_str())) {
            return SitemapSignal::Product;
        }

        let tokens = name_tokens(&name);
        if self
            .excluded_patterns
            .iter()
            .any(|p| contains_token_run(&tokens, &name_tokens(p)))
        {
            SitemapSignal::Excluded
        } else {
            SitemapSignal::Unknown
        }
    }

    /// Returns the children to enqueue, in index order
    pub fn select(&self, children: Vec<SitemapReference>) -> Vec<SitemapReference> {
        if self.policy == IndexPolicy::Exhaustive {
            return children;
        }

        let signals: Vec<SitemapSignal> = children.iter().map(|c| self.signal(&c.url)).collect();
        let has_product = signals.contains(&SitemapSignal::Product);

        children
            .into_iter()
            .zip(signals)
            .filter_map(|(child, signal)| {
                let keep = match signal {
                    SitemapSignal::Product => true,
                    SitemapSignal::Excluded => false,
                    SitemapSignal::Unknown => {
                        self.policy == IndexPolicy::Fallback && !has_product
                    }
                };
                if !keep {
                    tracing::debug!("Not following {} ({:?})", child.url, signal);
                }
                keep.then_some(child)
            })
            .collect()
    }
}

/// Splits a sitemap name into alphanumeric tokens
fn name_tokens(name: &str) -> Vec<&str> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// True if `pattern` appears as consecutive whole tokens of `tokens`
fn contains_token_run(tokens: &[&str], pattern: &[&str]) -> bool {
    if pattern.is_empty() || pattern.len() > tokens.len() {
        return false;
    }
    tokens.windows(pattern.len()).any(|window| {
        window
            .iter()
            .zip(pattern)
            .all(|(token, p)| token == p || token.strip_suffix('s') == Some(*p))
    })
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}
