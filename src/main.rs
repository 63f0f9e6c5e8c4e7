//! Sitemap Harvester main entry point
//!
//! This is the command-line interface for the sitemap-based product link harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sitemap_harvester::config::{compute_config_hash, read_config, validate, Config, DomainEntry};
use sitemap_harvester::crawler::harvest;
use sitemap_harvester::output::{generate_markdown_summary, print_summary, CsvExporter};
use sitemap_harvester::url::Domain;
use tracing_subscriber::EnvFilter;

/// Sitemap Harvester: product links from sitemap hierarchies
///
/// Reads each configured site's robots.txt, walks the sitemaps it declares and
/// writes the URLs that look like product pages to one CSV file per site.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvester")]
#[command(version)]
#[command(about = "Collects product page URLs from e-commerce sitemaps", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Harvest these sites instead of the configured [[domain]] list (repeatable)
    #[arg(long = "site", value_name = "SITE")]
    sites: Vec<String>,

    /// Write exports to this directory instead of [output].directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Disable the headless browser fallback (blocked sites are aborted)
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load(&cli)?;
    let config_hash = compute_config_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvester=info,warn"),
            1 => EnvFilter::new("sitemap_harvester=debug,info"),
            2 => EnvFilter::new("sitemap_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the config file, applies command-line overrides, then validates
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = read_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if !cli.sites.is_empty() {
        config.domains = cli.sites.iter().map(DomainEntry::new).collect();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if cli.no_browser {
        config.browser.enabled = false;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Sitemap Harvester Dry Run ===\n");

    println!("Traversal:");
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Max sitemap depth: {}", config.crawler.max_sitemap_depth);
    println!("  Index policy: {:?}", config.crawler.index_policy);
    println!("  XML sitemaps only: {}", config.crawler.xml_sitemaps_only);

    println!("\nBrowser fallback:");
    if config.browser.enabled {
        println!(
            "  Enabled (settle {}ms, page timeout {}s)",
            config.browser.settle_time_ms, config.browser.page_timeout_secs
        );
    } else {
        println!("  Disabled");
    }

    println!("\nProduct patterns: {}", config.filter.product_patterns.join(" "));

    let exporter = CsvExporter::new(&config.output.directory);
    println!("\nDomains ({}):", config.domains.len());
    for entry in &config.domains {
        match Domain::parse(&entry.site) {
            Ok(domain) => {
                println!("  - {}", domain);
                println!("    robots: {}", domain.robots_url());
                println!("    export: {}", exporter.path_for(&domain).display());
                if let Some(patterns) = &entry.product_patterns {
                    println!("    product patterns: {}", patterns.join(" "));
                }
            }
            Err(e) => println!("  - {} (invalid: {})", entry.site, e),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: String) -> anyhow::Result<()> {
    let summary_path = config.output.summary_path.clone();

    tracing::info!(
        "Domains: {}, output directory: {}",
        config.domains.len(),
        config.output.directory
    );

    let mut summary = harvest(config).await.context("failed to start harvester")?;
    summary.config_hash = Some(config_hash);

    print_summary(&summary);

    if let Some(path) = summary_path {
        match generate_markdown_summary(&summary, Path::new(&path)) {
            Ok(()) => tracing::info!("Summary written to {}", path),
            Err(e) => tracing::error!("Failed to write summary to {}: {}", path, e),
        }
    }

    Ok(())
}
