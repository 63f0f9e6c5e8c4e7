//! Sitemap state definitions for tracking traversal progress
//!
//! Every sitemap reference moves through
//! `Discovered → Fetching → {ClassifiedIndex | ClassifiedTerminal | Skipped}` exactly
//! once. Skipped references are never retried within a run.

use crate::HarvestError;
use std::collections::HashMap;
use std::fmt;

/// Represents the current state of a sitemap reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SitemapState {
    // ===== Active States =====
    /// Reference is known (from robots.txt or a parent index) but not fetched yet
    Discovered,

    /// Reference is being fetched
    Fetching,

    // ===== Terminal States =====
    /// Document was a sitemap index; its children were considered for the queue
    ClassifiedIndex,

    /// Document was a urlset; its entries went through the product filter
    ClassifiedTerminal,

    /// Fetch or parse failed, or the reference was beyond the depth limit
    Skipped,
}

impl SitemapState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Discovered | Self::Fetching)
    }

    /// Returns true if the reference was fetched and classified
    pub fn is_success(&self) -> bool {
        matches!(self, Self::ClassifiedIndex | Self::ClassifiedTerminal)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: SitemapState) -> bool {
        match self {
            Self::Discovered => matches!(next, Self::Fetching | Self::Skipped),
            Self::Fetching => next.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetching => "fetching",
            Self::ClassifiedIndex => "index",
            Self::ClassifiedTerminal => "terminal",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for SitemapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// States of every sitemap reference seen during one domain's traversal
///
/// Transitions are checked against `SitemapState::can_transition_to`; an illegal one
/// is reported as `HarvestError::InvalidTransition` and leaves the entry unchanged.
#[derive(Debug, Clone, Default)]
pub struct SitemapLedger {
    states: HashMap<String, SitemapState>,
}

impl SitemapLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly taken reference as `Discovered`
    pub fn discover(&mut self, url: &str) -> Result<(), HarvestError> {
        if let Some(existing) = self.states.get(url) {
            return Err(HarvestError::InvalidTransition {
                from: *existing,
                to: SitemapState::Discovered,
            });
        }
        self.states.insert(url.to_string(), SitemapState::Discovered);
        Ok(())
    }

    /// Moves a reference to `next`
    pub fn advance(&mut self, url: &str, next: SitemapState) -> Result<(), HarvestError> {
        let current = self
            .states
            .entry(url.to_string())
            .or_insert(SitemapState::Discovered);

        if !current.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: *current,
                to: next,
            });
        }
        *current = next;
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<SitemapState> {
        self.states.get(url).copied()
    }

    /// Number of references currently in `state`
    pub fn count(&self, state: SitemapState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SitemapState; 5] = [
        SitemapState::Discovered,
        SitemapState::Fetching,
        SitemapState::ClassifiedIndex,
        SitemapState::ClassifiedTerminal,
        SitemapState::Skipped,
    ];

    #[test]
    fn test_is_terminal() {
        assert!(!SitemapState::Discovered.is_terminal());
        assert!(!SitemapState::Fetching.is_terminal());

        assert!(SitemapState::ClassifiedIndex.is_terminal());
        assert!(SitemapState::ClassifiedTerminal.is_terminal());
        assert!(SitemapState::Skipped.is_terminal());
    }

    #[test]
    fn test_is_success() {
        assert!(SitemapState::ClassifiedIndex.is_success());
        assert!(SitemapState::ClassifiedTerminal.is_success());

        assert!(!SitemapState::Skipped.is_success());
        assert!(!SitemapState::Fetching.is_success());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(SitemapState::Discovered.can_transition_to(SitemapState::Fetching));
        assert!(SitemapState::Discovered.can_transition_to(SitemapState::Skipped));
        assert!(SitemapState::Fetching.can_transition_to(SitemapState::ClassifiedIndex));
        assert!(SitemapState::Fetching.can_transition_to(SitemapState::ClassifiedTerminal));
        assert!(SitemapState::Fetching.can_transition_to(SitemapState::Skipped));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!SitemapState::Discovered.can_transition_to(SitemapState::ClassifiedIndex));
        assert!(!SitemapState::Fetching.can_transition_to(SitemapState::Discovered));
        assert!(!SitemapState::Fetching.can_transition_to(SitemapState::Fetching));
    }

    #[test]
    fn test_terminal_states_never_transition() {
        for from in ALL.iter().filter(|s| s.is_terminal()) {
            for to in ALL {
                assert!(
                    !from.can_transition_to(to),
                    "{} should not move to {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(SitemapState::Discovered.to_string(), "discovered");
        assert_eq!(SitemapState::ClassifiedIndex.to_string(), "index");
        assert_eq!(SitemapState::Skipped.to_string(), "skipped");
    }

    #[test]
    fn test_ledger_walks_lifecycle() {
        let mut ledger = SitemapLedger::new();
        let url = "https://shop.com/sitemap.xml";

        ledger.discover(url).unwrap();
        ledger.advance(url, SitemapState::Fetching).unwrap();
        ledger.advance(url, SitemapState::ClassifiedTerminal).unwrap();

        assert_eq!(ledger.get(url), Some(SitemapState::ClassifiedTerminal));
        assert_eq!(ledger.count(SitemapState::ClassifiedTerminal), 1);
    }

    #[test]
    fn test_ledger_rejects_second_transition() {
        let mut ledger = SitemapLedger::new();
        let url = "https://shop.com/sitemap.xml";

        ledger.discover(url).unwrap();
        ledger.advance(url, SitemapState::Fetching).unwrap();
        ledger.advance(url, SitemapState::Skipped).unwrap();

        let err = ledger.advance(url, SitemapState::Fetching).unwrap_err();
        assert!(matches!(
            err,
            HarvestError::InvalidTransition {
                from: SitemapState::Skipped,
                to: SitemapState::Fetching
            }
        ));
        assert_eq!(ledger.get(url), Some(SitemapState::Skipped));
        assert!(ledger.discover(url).is_err());
    }
}
