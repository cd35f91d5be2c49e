use crate::filter::UrlFilter;
use crate::results::{ElementKind, InteractiveElement};
use crate::snapshot::RenderedPage;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

/// How the crawler treats an interactive element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    /// Followed: enqueued and recorded as an edge
    Navigation,
    /// Recorded on the page only, never invoked
    Inventory,
}

/// Picks the elements of a rendered page worth following
///
/// Navigation-bar items, tabs and in-scope links are candidates. Generic
/// buttons are never followed, nor is anything with a destructive label.
/// Nav-bar items seen on earlier pages stay candidates on pages where they
/// show up outside a recognised nav structure.
#[derive(Debug)]
pub struct NavigationDiscoverer {
    filter: Arc<UrlFilter>,
    max_tabs_per_page: usize,
    // Number of pages whose nav structure carried each (label, target)
    nav_sightings: HashMap<(String, Option<Url>), usize>,
}

impl NavigationDiscoverer {
    pub fn new(filter: Arc<UrlFilter>, max_tabs_per_page: usize) -> Self {
        Self {
            filter,
            max_tabs_per_page,
            nav_sightings: HashMap::new(),
        }
    }

    /// Decide whether an element of `page` is a navigation candidate
    pub fn classify(&self, page: &RenderedPage, element: &InteractiveElement) -> ElementRole {
        if self.filter.is_destructive(&element.label) {
            return ElementRole::Inventory;
        }

        // Off-site or asset targets are never followed, whatever the element
        if let Some(target) = &element.target {
            if !self.filter.in_scope(target) {
                return ElementRole::Inventory;
            }
        }

        if page.in_nav(element) || self.seen_in_nav(element) {
            return ElementRole::Navigation;
        }

        match element.kind {
            ElementKind::Tab => ElementRole::Navigation,
            ElementKind::Link if element.target.is_some() => ElementRole::Navigation,
            _ => ElementRole::Inventory,
        }
    }

    /// Navigation candidates of a page: nav-bar items first, then body links and tabs
    pub fn discover(&mut self, page: &RenderedPage) -> Vec<InteractiveElement> {
        self.note_nav_labels(page);

        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();
        let mut candidates = Vec::new();
        let mut tabs = 0;

        for element in page.nav.iter().chain(page.interactive.iter()) {
            if self.classify(page, element) != ElementRole::Navigation {
                ::log::trace!("Inventory only: {:?} on {}", element.label, page.url);
                continue;
            }
            let key = (
                element.label.as_str(),
                element.target.as_ref().map(|t| t.as_str()),
            );
            if !seen.insert(key) {
                continue;
            }
            if element.kind == ElementKind::Tab && element.target.is_none() {
                if tabs >= self.max_tabs_per_page {
                    ::log::debug!("Tab limit reached on {}, skipping {:?}", page.url, element.label);
                    continue;
                }
                tabs += 1;
            }
            candidates.push(element.clone());
        }

        ::log::debug!(
            "Discovered {} navigation candidates out of {} elements on {}",
            candidates.len(),
            page.nav.len() + page.interactive.len(),
            page.url
        );
        candidates
    }

    /// Whether the element was part of the nav structure of a page already discovered
    pub fn seen_in_nav(&self, element: &InteractiveElement) -> bool {
        self.nav_sightings
            .contains_key(&(element.label.clone(), element.target.clone()))
    }

    fn note_nav_labels(&mut self, page: &RenderedPage) {
        let items: HashSet<(&str, Option<&Url>)> = page
            .nav
            .iter()
            .map(|n| (n.label.as_str(), n.target.as_ref()))
            .collect();
        for (label, target) in items {
            let count = self
                .nav_sightings
                .entry((label.to_string(), target.cloned()))
                .or_insert(0);
            *count += 1;
            if *count == 2 {
                ::log::debug!("Nav item {:?} is part of the site-wide navigation", label);
            }
        }
    }
}
