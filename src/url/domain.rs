use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_harvester::url::extract_domain;
///
/// let url = Url::parse("https://SHOP.Example.com/products/1").unwrap();
/// assert_eq!(extract_domain(&url), Some("shop.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Removes a leading `www.` label
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Checks whether `host` belongs to the site rooted at `site_host`
///
/// `www.` is ignored on both sides, and subdomains of the site count as part of it,
/// so `m.shop.com` and `shop.com` both belong to `www.shop.com`.
pub fn is_same_site(host: &str, site_host: &str) -> bool {
    let host = strip_www(host);
    let site = strip_www(site_host);

    host == site || host.ends_with(&format!(".{}", site))
}
