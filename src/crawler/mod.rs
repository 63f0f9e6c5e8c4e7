//! Crawler module for sitemap traversal
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with the 403 switch to rendered fetching
//! - Sitemap classification (index vs urlset, gzip, rendered wrappers)
//! - The frontier and its visited set
//! - Product link and index-child filtering
//! - Overall traversal coordination

mod classifier;
mod coordinator;
mod fetcher;
mod filter;
mod frontier;
mod links;
mod parser;

pub use classifier::{classify, CandidateLink, SitemapDocument};
pub use coordinator::{CrawlReport, Harvester, SkippedSitemap};
pub use fetcher::{build_http_client, Fetched, Fetcher};
pub use filter::{ProductFilter, SitemapSelector, SitemapSignal};
pub use frontier::{Frontier, SitemapReference};
pub use links::ProductLinks;
pub use parser::{extract_rendered_text, parse_rendered_sitemap, RenderedRoot, RenderedSitemap};

use crate::config::Config;
use crate::output::{CsvExporter, RunSummary};
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Build the fetcher and the renderer the config asks for
/// 2. Harvest every configured domain in order
/// 3. Export each domain's links to `<output.directory>/<site>_products.csv`
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Every domain was attempted (individual domains may have failed)
/// * `Err(HarvestError)` - The harvester could not be built
///
/// # Example
///
/// ```no_run
/// use sitemap_harvester::config::load_config;
/// use sitemap_harvester::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = harvest(config).await?;
/// println!("{} product links", summary.total_links());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config) -> Result<RunSummary, HarvestError> {
    let exporter = CsvExporter::new(&config.output.directory);
    let mut harvester = Harvester::from_config(config)?;
    Ok(harvester.run(&exporter).await)
}
