use std::collections::HashSet;
use url::Url;

/// Product links collected for one domain
///
/// Behaves as a set (each URL once) that remembers first-insertion order, so exports
/// are deterministic for a given traversal.
#[derive(Debug, Clone, Default)]
pub struct ProductLinks {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ProductLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link; returns false if it was already present
    pub fn insert(&mut self, url: &Url) -> bool {
        let key = url.as_str();
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string());
        self.order.push(key.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Links in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
