/// Checks if a host matches a wildcard pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "cdn.shopify.com" matches only "cdn.shopify.com"
/// 2. Wildcard: "*.cloudfront.net" matches "cloudfront.net" and any subdomain of it
///
/// Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use sitemap_harvester::url::matches_wildcard;
///
/// assert!(matches_wildcard("cdn.shopify.com", "cdn.shopify.com"));
/// assert!(!matches_wildcard("cdn.shopify.com", "shopify.com"));
///
/// assert!(matches_wildcard("*.cloudfront.net", "d111.cloudfront.net"));
/// assert!(!matches_wildcard("*.cloudfront.net", "cloudfront.network"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
