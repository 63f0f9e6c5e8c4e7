//! Robots.txt handling module
//!
//! Robots.txt is only read for its `Sitemap:` directives, which are the entry points
//! of the sitemap traversal. It goes through the same fetcher as every sitemap, so a
//! 403 here already switches the domain to rendered fetching.

mod parser;

pub use parser::{is_xml_sitemap, ParsedRobots};

use crate::crawler::{extract_rendered_text, Fetcher};
use crate::state::{DomainState, FetchStrategy};
use crate::url::Domain;
use crate::HarvestError;
use url::Url;

/// Fetches robots.txt for a domain and returns its sitemap locations
///
/// # Arguments
///
/// * `fetcher` - The fetcher to use
/// * `state` - The domain's fetch state
/// * `domain` - The domain whose robots.txt is read
/// * `xml_only` - Drop directives that don't point at `.xml` / `.xml.gz` files
///
/// # Returns
///
/// * `Ok(Vec<Url>)` - Sitemap locations in file order (possibly empty)
/// * `Err(HarvestError::NotFound)` - robots.txt could not be retrieved
/// * `Err(e)` where `e.is_fatal()` - The rendered fallback is unavailable
pub async fn locate_sitemaps(
    fetcher: &Fetcher,
    state: &mut DomainState,
    domain: &Domain,
    xml_only: bool,
) -> Result<Vec<Url>, HarvestError> {
    let robots_url = domain.robots_url();

    let fetched = match fetcher.fetch(&robots_url, state).await {
        Ok(fetched) => fetched,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e @ HarvestError::NotFound { .. }) => return Err(e),
        Err(e) => {
            return Err(HarvestError::NotFound {
                url: robots_url.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let text = String::from_utf8_lossy(&fetched.body);
    let text = match fetched.strategy {
        FetchStrategy::Plain => text.into_owned(),
        FetchStrategy::Rendered => extract_rendered_text(&text),
    };

    let robots = ParsedRobots::from_content(&text);
    let sitemaps = robots.sitemap_urls(domain.origin(), xml_only);

    tracing::info!(
        "{}: robots.txt declares {} sitemap(s)",
        domain,
        sitemaps.len()
    );

    Ok(sitemaps)
}
