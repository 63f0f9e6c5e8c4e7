//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SitemapState`: lifecycle of a single sitemap reference (discovered, fetching, classified, skipped)
//! - `DomainState`: per-domain fetch strategy and request counts
//! - `SitemapLedger`: checked state transitions for one traversal
//! - `DomainStates`: the per-session map of domain states

mod domain_state;
mod sitemap_state;

// Re-export main types
pub use domain_state::{DomainState, DomainStates, FetchStrategy};
pub use sitemap_state::{SitemapLedger, SitemapState};
