//! Configuration module for Sitemap Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; the defaults reproduce the stock product and sitemap
//! heuristics, so a file listing only `[[domain]]` entries is a complete config.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting {} sites", config.domains.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, DomainEntry, FetchConfig, FilterConfig, IndexPolicy,
    OutputConfig, SitemapConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, read_config};
pub use validation::validate;
