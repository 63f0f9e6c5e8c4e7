use crate::UrlError;
use url::Url;

/// Normalizes a `<loc>` value or robots directive into an absolute URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace (sitemaps often pretty-print `<loc>` bodies)
/// 2. Resolve against `base`, so `/sitemap-products.xml` becomes absolute
/// 3. Reject anything that isn't HTTP(S) or has no host
/// 4. Remove the fragment
/// 5. Remove a trailing slash from the path (except for the root `/`)
///
/// The resulting string is what the visited set and the product set compare, so
/// `https://x.com/a/` and `https://x.com/a#top` collapse to one entry.
///
/// # Examples
///
/// ```
/// use sitemap_harvester::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://shop.com/sitemap_index.xml").unwrap();
/// let url = normalize_url(" /products/shirt/ ", &base).unwrap();
/// assert_eq!(url.as_str(), "https://shop.com/products/shirt");
/// ```
pub fn normalize_url(raw: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty location".to_string()));
    }

    let mut url = base
        .join(trimmed)
        .map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed_path = path.trim_end_matches('/').to_string();
        let trimmed_path = if trimmed_path.is_empty() {
            "/".to_string()
        } else {
            trimmed_path
        };
        url.set_path(&trimmed_path);
    }

    Ok(url)
}
