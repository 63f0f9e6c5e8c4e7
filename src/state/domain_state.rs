use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// How requests to a domain are carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStrategy {
    /// Plain HTTP GET with browser-like headers
    Plain,
    /// Load in a headless browser and read back the rendered document
    Rendered,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// Tracks the fetch state of one domain during a crawl
///
/// The strategy starts as `Plain` and moves to `Rendered` the first time the domain
/// answers 403. The move is one-way: nothing in this type can switch a domain back.
#[derive(Debug, Clone)]
pub struct DomainState {
    strategy: FetchStrategy,

    /// When the domain was first seen denying a plain request
    blocked_at: Option<DateTime<Utc>>,

    /// Requests served over plain HTTP
    pub plain_requests: u32,

    /// Requests served through the browser
    pub rendered_requests: u32,
}

impl DomainState {
    /// Creates a new DomainState using the plain strategy
    pub fn new() -> Self {
        Self {
            strategy: FetchStrategy::Plain,
            blocked_at: None,
            plain_requests: 0,
            rendered_requests: 0,
        }
    }

    /// Strategy to use for the next request
    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Returns true once the domain has denied a plain request
    pub fn is_blocked(&self) -> bool {
        self.strategy == FetchStrategy::Rendered
    }

    pub fn blocked_at(&self) -> Option<DateTime<Utc>> {
        self.blocked_at
    }

    /// Switches the domain to rendered fetching for the rest of the run
    ///
    /// Returns true if this call performed the transition, false if the domain was
    /// already blocked (the original timestamp is kept).
    pub fn mark_blocked(&mut self) -> bool {
        if self.is_blocked() {
            return false;
        }
        self.strategy = FetchStrategy::Rendered;
        self.blocked_at = Some(Utc::now());
        true
    }

    /// Records that a request was made with the given strategy
    pub fn record_request(&mut self, strategy: FetchStrategy) {
        match strategy {
            FetchStrategy::Plain => self.plain_requests += 1,
            FetchStrategy::Rendered => self.rendered_requests += 1,
        }
    }

    /// Total number of requests made to this domain
    pub fn total_requests(&self) -> u32 {
        self.plain_requests + self.rendered_requests
    }
}

impl Default for DomainState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-domain fetch state for one crawl session
///
/// Owned by the harvester for the duration of a run and passed explicitly to the
/// fetcher, so separate runs never share blocked flags.
#[derive(Debug, Clone, Default)]
pub struct DomainStates {
    states: HashMap<String, DomainState>,
}

impl DomainStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state for a domain key, creating a plain one if needed
    pub fn entry(&mut self, key: &str) -> &mut DomainState {
        self.states
            .entry(key.to_string())
            .or_insert_with(DomainState::new)
    }

    pub fn get(&self, key: &str) -> Option<&DomainState> {
        self.states.get(key)
    }

    /// Strategy for a domain; unknown domains use the plain path
    pub fn strategy(&self, key: &str) -> FetchStrategy {
        self.states
            .get(key)
            .map(DomainState::strategy)
            .unwrap_or(FetchStrategy::Plain)
    }

    /// Keys of all domains that switched to rendered fetching
    pub fn blocked_domains(&self) -> Vec<String> {
        let mut blocked: Vec<String> = self
            .states
            .iter()
            .filter(|(_, state)| state.is_blocked())
            .map(|(key, _)| key.clone())
            .collect();
        blocked.sort();
        blocked
    }
}
