//! Harvest coordinator - sitemap traversal and run orchestration
//!
//! This module contains the traversal loop that coordinates every part of a
//! domain's harvest, including:
//! - Locating sitemaps through robots.txt
//! - Draining the frontier one reference at a time
//! - Classifying documents and choosing which index children to follow
//! - Filtering urlset entries into the product link set
//! - Running every configured domain and reporting the outcomes

use crate::config::{Config, DomainEntry};
use crate::crawler::classifier::{classify, SitemapDocument};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::filter::{ProductFilter, SitemapSelector};
use crate::crawler::frontier::{Frontier, SitemapReference};
use crate::crawler::links::ProductLinks;
use crate::output::{DomainOutcome, DomainSummary, Exporter, RunSummary};
use crate::renderer::{ChromiumRenderer, DisabledRenderer, Renderer};
use crate::robots::locate_sitemaps;
use crate::state::{DomainStates, FetchStrategy, SitemapLedger, SitemapState};
use crate::url::Domain;
use crate::HarvestError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A sitemap reference that was not classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSitemap {
    pub url: String,
    pub reason: String,
}

/// Result of harvesting one domain
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub domain: Domain,

    /// Product links in discovery order
    pub links: ProductLinks,

    /// Sitemap locations declared in robots.txt
    pub sitemaps_declared: usize,

    /// Documents classified as sitemap indexes
    pub indexes: usize,

    /// Documents classified as urlsets
    pub terminals: usize,

    /// Urlset entries seen before filtering
    pub candidates_seen: usize,

    pub skipped: Vec<SkippedSitemap>,

    /// Strategy in effect when the traversal ended
    pub strategy: FetchStrategy,

    pub elapsed: Duration,

    ledger: SitemapLedger,
}

impl CrawlReport {
    fn new(domain: Domain) -> Self {
        Self {
            domain,
            links: ProductLinks::new(),
            sitemaps_declared: 0,
            indexes: 0,
            terminals: 0,
            candidates_seen: 0,
            skipped: Vec::new(),
            strategy: FetchStrategy::Plain,
            elapsed: Duration::ZERO,
            ledger: SitemapLedger::new(),
        }
    }

    /// Documents fetched and classified
    pub fn sitemaps_visited(&self) -> usize {
        self.indexes + self.terminals
    }

    /// Final state of a sitemap reference, if it was taken from the frontier
    pub fn sitemap_state(&self, url: &str) -> Option<SitemapState> {
        self.ledger.get(url)
    }

    fn skip(&mut self, reference: &SitemapReference, reason: String) -> Result<(), HarvestError> {
        self.ledger.advance(reference.key(), SitemapState::Skipped)?;
        self.skipped.push(SkippedSitemap {
            url: reference.url.to_string(),
            reason,
        });
        Ok(())
    }
}

/// Harvests product links from the configured domains
///
/// Owns the per-domain fetch state for the session, so a domain that switched to
/// rendered fetching stays rendered until the harvester is dropped.
pub struct Harvester {
    config: Config,
    fetcher: Fetcher,
    selector: SitemapSelector,
    states: DomainStates,
}

impl Harvester {
    /// Creates a harvester that renders blocked domains with `renderer`
    pub fn new(config: Config, renderer: Arc<dyn Renderer>) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::new(&config, renderer)?;
        let selector = SitemapSelector::new(&config.crawler, &config.sitemaps);

        Ok(Self {
            config,
            fetcher,
            selector,
            states: DomainStates::new(),
        })
    }

    /// Creates a harvester with the renderer the config asks for
    ///
    /// Headless Chromium when `[browser].enabled`, otherwise a renderer that
    /// reports the browser as unavailable.
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let renderer: Arc<dyn Renderer> = if config.browser.enabled {
            Arc::new(ChromiumRenderer::new(&config.browser, &config.fetch))
        } else {
            Arc::new(DisabledRenderer)
        };
        Self::new(config, renderer)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn domain_states(&self) -> &DomainStates {
        &self.states
    }

    /// Harvests one configured domain
    pub async fn crawl(&mut self, entry: &DomainEntry) -> Result<CrawlReport, HarvestError> {
        let domain = Domain::parse(&entry.site)?;
        let filter = ProductFilter::for_domain(&self.config.filter, entry, &domain);
        self.crawl_domain(&domain, &filter).await
    }

    /// Runs the sitemap traversal for `domain`
    ///
    /// # Procedure
    ///
    /// 1. Read the sitemap locations from robots.txt and seed the frontier
    /// 2. Take the next unvisited reference
    ///    - beyond the depth limit → Skipped
    ///    - fetch or parse failure → Skipped, traversal continues
    ///    - index → enqueue the children the selector keeps
    ///    - urlset → add entries that pass `filter` to the link set
    /// 3. Stop when the frontier is empty
    ///
    /// # Errors
    ///
    /// * `HarvestError::NotFound` - robots.txt could not be retrieved
    /// * any fatal error (`is_fatal()`) - the traversal stops immediately
    pub async fn crawl_domain(
        &mut self,
        domain: &Domain,
        filter: &ProductFilter,
    ) -> Result<CrawlReport, HarvestError> {
        let started = Instant::now();
        let key = domain.key();
        let mut report = CrawlReport::new(domain.clone());

        tracing::info!("Harvesting {}", domain);

        let sitemaps = locate_sitemaps(
            &self.fetcher,
            self.states.entry(&key),
            domain,
            self.config.crawler.xml_sitemaps_only,
        )
        .await?;
        report.sitemaps_declared = sitemaps.len();

        if sitemaps.is_empty() {
            tracing::warn!("{}: robots.txt declares no usable sitemaps", domain);
        }

        let mut frontier = Frontier::new(self.config.crawler.max_sitemap_depth);
        for url in sitemaps {
            frontier.push(SitemapReference::root(url));
        }

        while let Some(reference) = frontier.next() {
            report.ledger.discover(reference.key())?;

            if !frontier.within_depth(&reference) {
                tracing::warn!(
                    "Skipping {}: nested {} levels deep",
                    reference.url,
                    reference.depth
                );
                report.skip(&reference, format!("depth {} exceeds limit", reference.depth))?;
                continue;
            }

            report.ledger.advance(reference.key(), SitemapState::Fetching)?;

            let fetched = match self
                .fetcher
                .fetch(&reference.url, self.states.entry(&key))
                .await
            {
                Ok(fetched) => fetched,
                Err(e) if e.is_fatal() => {
                    tracing::error!("{}: aborting at {}: {}", domain, reference.url, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", reference.url, e);
                    report.skip(&reference, e.to_string())?;
                    continue;
                }
            };

            match classify(&fetched.body, &reference) {
                Ok(SitemapDocument::Index(children)) => {
                    report
                        .ledger
                        .advance(reference.key(), SitemapState::ClassifiedIndex)?;
                    report.indexes += 1;

                    let listed = children.len();
                    let selected = self.selector.select(children);
                    tracing::info!(
                        "{}: index {} lists {} sitemap(s), following {}",
                        domain,
                        reference.url,
                        listed,
                        selected.len()
                    );
                    for child in selected {
                        frontier.push(child);
                    }
                }
                Ok(SitemapDocument::Terminal(candidates)) => {
                    report
                        .ledger
                        .advance(reference.key(), SitemapState::ClassifiedTerminal)?;
                    report.terminals += 1;
                    report.candidates_seen += candidates.len();

                    let before = report.links.len();
                    for candidate in &candidates {
                        if filter.is_product_link(&candidate.url) {
                            report.links.insert(&candidate.url);
                        }
                    }
                    tracing::info!(
                        "{}: {} lists {} url(s), {} new product link(s)",
                        domain,
                        reference.url,
                        candidates.len(),
                        report.links.len() - before
                    );
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", reference.url, e);
                    report.skip(&reference, e.to_string())?;
                }
            }
        }

        report.strategy = self.states.strategy(&key);
        report.elapsed = started.elapsed();

        if report.links.is_empty() {
            tracing::warn!(
                "{}: no product links in {} sitemap location(s)",
                domain,
                frontier.visited_count()
            );
        }

        tracing::info!(
            "{}: {} product link(s) from {} sitemap(s) in {:?} ({} skipped, {} fetching)",
            domain,
            report.links.len(),
            report.sitemaps_visited(),
            report.elapsed,
            report.skipped.len(),
            report.strategy
        );

        Ok(report)
    }

    /// Harvests every configured domain in order and exports each link set
    ///
    /// A domain's failure never stops the run; it is recorded in the summary and
    /// the next domain starts.
    pub async fn run(&mut self, exporter: &dyn Exporter) -> RunSummary {
        let mut summary = RunSummary::new();
        let entries = self.config.domains.clone();

        tracing::info!("Starting harvest of {} domain(s)", entries.len());

        for entry in &entries {
            let started = Instant::now();

            let domain_summary = match self.crawl(entry).await {
                Ok(report) => {
                    let outcome = match exporter.export(&report.domain, &report.links) {
                        Ok(export) => DomainOutcome::Completed {
                            links: report.links.len(),
                            export,
                        },
                        Err(e) => {
                            tracing::error!("{}: export failed: {}", report.domain, e);
                            DomainOutcome::Aborted {
                                reason: format!("export failed: {}", e),
                            }
                        }
                    };
                    DomainSummary {
                        site: entry.site.clone(),
                        outcome,
                        sitemaps_visited: report.sitemaps_visited(),
                        sitemaps_skipped: report.skipped.len(),
                        strategy: report.strategy,
                        elapsed_ms: started.elapsed().as_millis(),
                    }
                }
                Err(e) => {
                    let outcome = match &e {
                        HarvestError::NotFound { .. } => {
                            tracing::warn!("{}: robots.txt unavailable: {}", entry.site, e);
                            DomainOutcome::Unreachable {
                                reason: e.to_string(),
                            }
                        }
                        _ => {
                            tracing::error!("{}: harvest aborted: {}", entry.site, e);
                            DomainOutcome::Aborted {
                                reason: e.to_string(),
                            }
                        }
                    };
                    let strategy = Domain::parse(&entry.site)
                        .map(|d| self.states.strategy(&d.key()))
                        .unwrap_or(FetchStrategy::Plain);
                    DomainSummary {
                        site: entry.site.clone(),
                        outcome,
                        sitemaps_visited: 0,
                        sitemaps_skipped: 0,
                        strategy,
                        elapsed_ms: started.elapsed().as_millis(),
                    }
                }
            };

            summary.record(domain_summary);
        }

        summary.finish();

        let rendered = self.states.blocked_domains();
        if !rendered.is_empty() {
            tracing::info!("Fetched through the browser: {}", rendered.join(", "));
        }

        tracing::info!(
            "Harvest finished: {} link(s), {} completed, {} unreachable, {} aborted",
            summary.total_links(),
            summary.completed(),
            summary.unreachable(),
            summary.aborted()
        );

        summary
    }
}
