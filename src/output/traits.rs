//! Output traits and types
//!
//! This module defines the export interface that receives each domain's product
//! links, and the run summary reported once every domain has been attempted.

use crate::crawler::ProductLinks;
use crate::state::FetchStrategy;
use crate::url::Domain;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the final link set of each domain
pub trait Exporter {
    /// Persists `links` for `domain` and returns where they were written
    ///
    /// Called once per completed domain, including domains with no links.
    fn export(&self, domain: &Domain, links: &ProductLinks) -> OutputResult<PathBuf>;
}

/// How a domain's harvest ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Traversal finished and the links were exported (possibly zero of them)
    Completed { links: usize, export: PathBuf },

    /// robots.txt could not be retrieved
    Unreachable { reason: String },

    /// A fatal error stopped the traversal, or the export failed
    Aborted { reason: String },
}

impl DomainOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { links: 0, .. } => "completed (empty)",
            Self::Completed { .. } => "completed",
            Self::Unreachable { .. } => "unreachable",
            Self::Aborted { .. } => "aborted",
        }
    }

    pub fn link_count(&self) -> usize {
        match self {
            Self::Completed { links, .. } => *links,
            _ => 0,
        }
    }
}

/// Per-domain entry of the run summary
#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub site: String,
    pub outcome: DomainOutcome,
    pub sitemaps_visited: usize,
    pub sitemaps_skipped: usize,
    /// Strategy in effect when the domain finished
    pub strategy: FetchStrategy,
    pub elapsed_ms: u128,
}

/// Summary of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: Option<String>,
    pub domains: Vec<DomainSummary>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: None,
            domains: Vec::new(),
        }
    }

    pub fn record(&mut self, domain: DomainSummary) {
        self.domains.push(domain);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, if the run has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_links(&self) -> usize {
        self.domains.iter().map(|d| d.outcome.link_count()).sum()
    }

    /// Domains that completed, empty or not
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Completed { .. }))
    }

    /// Completed domains that produced no links
    pub fn empty(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Completed { links: 0, .. }))
    }

    pub fn unreachable(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Unreachable { .. }))
    }

    pub fn aborted(&self) -> usize {
        self.count(|o| matches!(o, DomainOutcome::Aborted { .. }))
    }

    fn count(&self, predicate: impl Fn(&DomainOutcome) -> bool) -> usize {
        self.domains.iter().filter(|d| predicate(&d.outcome)).count()
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(site: &str, outcome: DomainOutcome) -> DomainSummary {
        DomainSummary {
            site: site.to_string(),
            outcome,
            sitemaps_visited: 1,
            sitemaps_skipped: 0,
            strategy: FetchStrategy::Plain,
            elapsed_ms: 10,
        }
    }

    #[test]
    fn test_counts() {
        let mut run = RunSummary::new();
        run.record(summary(
            "a.com",
            DomainOutcome::Completed {
                links: 5,
                export: PathBuf::from("a.com_products.csv"),
            },
        ));
        run.record(summary(
            "b.com",
            DomainOutcome::Completed {
                links: 0,
                export: PathBuf::from("b.com_products.csv"),
            },
        ));
        run.record(summary(
            "c.com",
            DomainOutcome::Unreachable {
                reason: "HTTP 404".to_string(),
            },
        ));
        run.record(summary(
            "d.com",
            DomainOutcome::Aborted {
                reason: "no browser".to_string(),
            },
        ));

        assert_eq!(run.completed(), 2);
        assert_eq!(run.empty(), 1);
        assert_eq!(run.unreachable(), 1);
        assert_eq!(run.aborted(), 1);
        assert_eq!(run.total_links(), 5);
    }

    #[test]
    fn test_labels() {
        let empty = DomainOutcome::Completed {
            links: 0,
            export: PathBuf::new(),
        };
        assert_eq!(empty.label(), "completed (empty)");
        assert_eq!(
            DomainOutcome::Unreachable {
                reason: String::new()
            }
            .label(),
            "unreachable"
        );
    }

    #[test]
    fn test_duration_after_finish() {
        let mut run = RunSummary::new();
        assert!(run.duration_seconds().is_none());
        run.finish();
        assert!(run.duration_seconds().unwrap() >= 0);
    }
}
