//! Frontier of sitemap references awaiting a fetch
//!
//! This module handles:
//! - FIFO ordering of discovered sitemap references
//! - The visited set that makes each location fetch at most once
//! - Depth bookkeeping for the nesting limit

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A sitemap location queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapReference {
    /// Normalized location of the sitemap document
    pub url: Url,

    /// Nesting depth; references from robots.txt are at depth 0
    pub depth: u32,
}

impl SitemapReference {
    /// Reference declared directly in robots.txt
    pub fn root(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Reference listed by this (index) document
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    /// Identity used by the visited set
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

/// FIFO queue of sitemap references with a visited set
///
/// A location is handed out by `next` at most once per frontier, no matter how many
/// indexes list it. Cyclic index graphs therefore terminate once every distinct
/// location has been taken.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<SitemapReference>,
    visited: HashSet<String>,
    max_depth: u32,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
        }
    }

    /// Enqueues a reference
    ///
    /// Returns false (and does nothing) if the location was already taken.
    pub fn push(&mut self, reference: SitemapReference) -> bool {
        if self.visited.contains(reference.key()) {
            tracing::debug!("Already visited {}, not queueing", reference.url);
            return false;
        }
        self.queue.push_back(reference);
        true
    }

    /// Takes the next unvisited reference and marks it visited
    pub fn next(&mut self) -> Option<SitemapReference> {
        while let Some(reference) = self.queue.pop_front() {
            if self.visited.insert(reference.key().to_string()) {
                return Some(reference);
            }
            tracing::debug!("Skipping duplicate {}", reference.url);
        }
        None
    }

    /// Returns true if the reference is within the nesting limit
    pub fn within_depth(&self, reference: &SitemapReference) -> bool {
        reference.depth <= self.max_depth
    }

    /// Number of distinct locations taken so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
