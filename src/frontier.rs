use crate::fingerprint::Fingerprint;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A pending visit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontierEntry {
    /// Render this URL directly
    Direct { url: Url },

    /// Re-render the source page and invoke the labelled element on it
    Activate { source: Fingerprint, label: String },
}

impl FrontierEntry {
    pub fn direct(url: Url) -> Self {
        FrontierEntry::Direct { url }
    }

    pub fn activate(source: Fingerprint, label: impl Into<String>) -> Self {
        FrontierEntry::Activate {
            source,
            label: label.into(),
        }
    }

    /// Fingerprint of the target, when it is known before visiting
    pub fn resolved_fingerprint(&self) -> Option<Fingerprint> {
        match self {
            FrontierEntry::Direct { url } => Some(Fingerprint::from_url(url)),
            FrontierEntry::Activate { .. } => None,
        }
    }
}

/// Breadth-first work queue plus the set of visited pages
#[derive(Debug, Default)]
pub struct CrawlFrontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<Fingerprint>,
    queued: HashSet<Fingerprint>,
    queued_actions: HashSet<(Fingerprint, String)>,
}

impl CrawlFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a frontier holding only the seed URL
    pub fn seeded(seed: Url) -> Self {
        let mut frontier = Self::new();
        frontier.push(FrontierEntry::direct(seed));
        frontier
    }

    /// Append an entry after everything already queued
    ///
    /// Returns false, leaving the queue untouched, when the entry's target is
    /// already visited or has been queued before (a target whose fetch failed
    /// is not retried). Activation entries are deduplicated on their
    /// (source, label) pair.
    pub fn push(&mut self, entry: FrontierEntry) -> bool {
        if let Some(fp) = entry.resolved_fingerprint() {
            if self.visited.contains(&fp) || !self.queued.insert(fp) {
                return false;
            }
        } else if let FrontierEntry::Activate { source, label } = &entry {
            if !self.queued_actions.insert((source.clone(), label.clone())) {
                return false;
            }
        }
        self.queue.push_back(entry);
        true
    }

    pub fn pop_next(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    /// Record a page as visited; returns false if it already was
    pub fn mark_visited(&mut self, fp: Fingerprint) -> bool {
        self.visited.insert(fp)
    }

    pub fn is_visited(&self, fp: &Fingerprint) -> bool {
        self.visited.contains(fp)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::from_url(&url(s))
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = CrawlFrontier::seeded(url("https://example.com/"));
        assert!(frontier.push(FrontierEntry::direct(url("https://example.com/a"))));
        assert!(frontier.push(FrontierEntry::activate(fp("https://example.com/"), "Tab")));
        assert!(frontier.push(FrontierEntry::direct(url("https://example.com/b"))));
        assert_eq!(frontier.len(), 4);

        assert_eq!(
            frontier.pop_next(),
            Some(FrontierEntry::direct(url("https://example.com/")))
        );
        assert_eq!(
            frontier.pop_next(),
            Some(FrontierEntry::direct(url("https://example.com/a")))
        );
        assert_eq!(
            frontier.pop_next(),
            Some(FrontierEntry::activate(fp("https://example.com/"), "Tab"))
        );
        assert_eq!(
            frontier.pop_next(),
            Some(FrontierEntry::direct(url("https://example.com/b")))
        );
        assert_eq!(frontier.pop_next(), None);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_queued_duplicates_are_ignored() {
        let mut frontier = CrawlFrontier::new();
        assert!(frontier.push(FrontierEntry::direct(url("https://example.com/a?x=1&y=2"))));
        // Same fingerprint, different spelling
        assert!(!frontier.push(FrontierEntry::direct(url("https://example.com/a/?y=2&x=1#top"))));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_visited_targets_are_ignored() {
        let mut frontier = CrawlFrontier::new();
        assert!(frontier.mark_visited(fp("https://example.com/a")));
        assert!(!frontier.mark_visited(fp("https://example.com/a")));
        assert!(!frontier.push(FrontierEntry::direct(url("https://example.com/a/"))));
        assert!(frontier.is_empty());
        assert!(frontier.is_visited(&fp("https://example.com/a")));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_popped_targets_are_not_requeued() {
        let mut frontier = CrawlFrontier::seeded(url("https://example.com/a"));
        frontier.pop_next();
        assert!(!frontier.push(FrontierEntry::direct(url("https://example.com/a"))));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_activation_entries_dedup_on_source_and_label() {
        let mut frontier = CrawlFrontier::new();
        let home = fp("https://example.com/");
        assert!(frontier.push(FrontierEntry::activate(home.clone(), "Overview")));
        assert!(!frontier.push(FrontierEntry::activate(home.clone(), "Overview")));
        assert!(frontier.push(FrontierEntry::activate(home.clone(), "Activity")));
        assert!(frontier.push(FrontierEntry::activate(fp("https://example.com/x"), "Overview")));

        // Activations stay deduplicated after being popped
        while frontier.pop_next().is_some() {}
        assert!(!frontier.push(FrontierEntry::activate(home, "Overview")));
    }
}
