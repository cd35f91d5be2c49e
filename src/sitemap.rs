use crate::fingerprint::Fingerprint;
use crate::results::PageRecord;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// A navigation edge between two pages of the site map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEdge {
    pub from: Fingerprint,
    pub label: String,
    /// Target page, or None when the element's destination was never captured
    pub to: Option<Fingerprint>,
}

/// Leading characters compared when deciding whether tab content is new
const TAB_TEXT_PREFIX_CHARS: usize = 500;

/// Content revealed by a client-side tab that left the page URL unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabView {
    /// Page the tab belongs to
    pub from: Fingerprint,
    pub label: String,
    /// Page title suffixed with the tab label
    pub title: String,
    pub text: String,
}

/// Discovered pages, in discovery order, and the navigation edges between them
#[derive(Debug, Clone, Serialize)]
pub struct SiteMap {
    home_url: Url,
    pages: Vec<PageRecord>,
    edges: Vec<NavigationEdge>,
    tab_views: Vec<TabView>,
    #[serde(skip)]
    index: HashMap<Fingerprint, usize>,
}

impl SiteMap {
    /// URL the crawl started from
    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<&PageRecord> {
        self.index.get(fp).map(|&i| &self.pages[i])
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.index.contains_key(fp)
    }

    /// Pages in discovery order
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.iter()
    }

    pub fn edges(&self) -> &[NavigationEdge] {
        &self.edges
    }

    /// Same-page tab contents, in the order they were captured
    pub fn tab_views(&self) -> &[TabView] {
        &self.tab_views
    }

    /// Edges whose target page is unknown
    pub fn unresolved_edges(&self) -> impl Iterator<Item = &NavigationEdge> {
        self.edges.iter().filter(|e| e.to.is_none())
    }

    /// Total number of interactive elements across all pages
    pub fn interactive_count(&self) -> usize {
        self.pages.iter().map(|p| p.interactive().len()).sum()
    }
}

#[derive(Debug)]
struct PendingEdge {
    from: Fingerprint,
    label: String,
    target: Option<Fingerprint>,
}

/// Accumulates pages and edges during a crawl
///
/// Enforces the site-map invariants: one record per fingerprint, never more
/// than `max_pages` records, and edges only leave pages that exist.
#[derive(Debug)]
pub struct SiteMapBuilder {
    home_url: Url,
    max_pages: usize,
    pages: Vec<PageRecord>,
    index: HashMap<Fingerprint, usize>,
    edges: Vec<PendingEdge>,
    tab_views: Vec<TabView>,
    // Requested fingerprint -> fingerprint of the page actually rendered
    redirects: HashMap<Fingerprint, Fingerprint>,
}

impl SiteMapBuilder {
    pub fn new(home_url: Url, max_pages: usize) -> Self {
        Self {
            home_url,
            max_pages,
            pages: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            tab_views: Vec::new(),
            redirects: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether the page budget has been reached
    pub fn is_full(&self) -> bool {
        self.pages.len() >= self.max_pages
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.index.contains_key(fp)
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<&PageRecord> {
        self.index.get(fp).map(|&i| &self.pages[i])
    }

    /// Add a page; returns false if its fingerprint is known or the budget is spent
    pub fn add_page(&mut self, record: PageRecord) -> bool {
        if self.is_full() || self.contains(record.fingerprint()) {
            return false;
        }
        self.index
            .insert(record.fingerprint().clone(), self.pages.len());
        self.pages.push(record);
        true
    }

    /// Record an edge leaving `from`; returns false if `from` is not a known page
    ///
    /// `target` is the fingerprint the element points at, when known up front.
    pub fn record_edge(
        &mut self,
        from: &Fingerprint,
        label: &str,
        target: Option<Fingerprint>,
    ) -> bool {
        if !self.contains(from) {
            ::log::warn!("Dropping edge {:?} from unknown page {}", label, from);
            return false;
        }
        self.edges.push(PendingEdge {
            from: from.clone(),
            label: label.to_string(),
            target,
        });
        true
    }

    /// Fill in the target of edges `from --label-->` discovered by activation
    pub fn resolve_edge(&mut self, from: &Fingerprint, label: &str, to: &Fingerprint) {
        for edge in self
            .edges
            .iter_mut()
            .filter(|e| e.target.is_none() && &e.from == from && e.label == label)
        {
            edge.target = Some(to.clone());
        }
    }

    /// Keep the content a same-page tab revealed on `from`
    ///
    /// Returns false when `from` is unknown or the text starts like a page or
    /// tab already captured.
    pub fn add_tab_view(
        &mut self,
        from: &Fingerprint,
        label: &str,
        title: &str,
        text: &str,
    ) -> bool {
        if !self.contains(from) {
            ::log::warn!("Dropping tab {:?} of unknown page {}", label, from);
            return false;
        }

        let prefix = text_prefix(text);
        let seen = self.pages.iter().any(|p| text_prefix(p.text()) == prefix)
            || self.tab_views.iter().any(|t| text_prefix(&t.text) == prefix);
        if seen {
            ::log::debug!("Tab {:?} on {} shows no new content", label, from);
            return false;
        }

        self.tab_views.push(TabView {
            from: from.clone(),
            label: label.to_string(),
            title: format!("{} - {}", title, label),
            text: text.to_string(),
        });
        true
    }

    /// Note that requesting `requested` rendered the page `landed`
    pub fn record_redirect(&mut self, requested: Fingerprint, landed: Fingerprint) {
        if requested != landed {
            self.redirects.insert(requested, landed);
        }
    }

    /// Finalize the site map; targets never visited become unresolved
    pub fn finish(self) -> SiteMap {
        let index = self.index;
        let redirects = self.redirects;
        let edges = self
            .edges
            .into_iter()
            .map(|e| NavigationEdge {
                to: e
                    .target
                    .map(|t| redirects.get(&t).cloned().unwrap_or(t))
                    .filter(|t| index.contains_key(t)),
                from: e.from,
                label: e.label,
            })
            .collect();

        SiteMap {
            home_url: self.home_url,
            pages: self.pages,
            edges,
            tab_views: self.tab_views,
            index,
        }
    }
}

fn text_prefix(text: &str) -> &str {
    match text.char_indices().nth(TAB_TEXT_PREFIX_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn record(s: &str) -> PageRecord {
        let u = url(s);
        PageRecord::new(
            Fingerprint::from_url(&u),
            u,
            String::new(),
            String::new(),
            Vec::new(),
            Vec::new(),
            None,
        )
    }

    #[test]
    fn test_pages_keep_discovery_order_and_are_unique() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        assert!(builder.add_page(record("https://example.com/")));
        assert!(builder.add_page(record("https://example.com/b")));
        assert!(builder.add_page(record("https://example.com/a")));
        assert!(!builder.add_page(record("https://example.com/b/")));

        let map = builder.finish();
        let urls: Vec<&str> = map.pages().map(|p| p.url().as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://example.com/", "https://example.com/b", "https://example.com/a"]
        );
    }

    #[test]
    fn test_budget_is_enforced() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 1);
        assert!(builder.add_page(record("https://example.com/")));
        assert!(builder.is_full());
        assert!(!builder.add_page(record("https://example.com/b")));
        assert_eq!(builder.finish().len(), 1);
    }

    #[test]
    fn test_edges_require_known_source() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record("https://example.com/");
        let home_fp = home.fingerprint().clone();
        let ghost = Fingerprint::from_url(&url("https://example.com/ghost"));
        builder.add_page(home);

        assert!(builder.record_edge(&home_fp, "Docs", None));
        assert!(!builder.record_edge(&ghost, "Back", Some(home_fp.clone())));
        assert_eq!(builder.finish().edges().len(), 1);
    }

    #[test]
    fn test_unvisited_targets_become_unresolved() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record("https://example.com/");
        let home_fp = home.fingerprint().clone();
        let docs = record("https://example.com/docs");
        let docs_fp = docs.fingerprint().clone();
        let pricing_fp = Fingerprint::from_url(&url("https://example.com/pricing"));
        builder.add_page(home);
        builder.add_page(docs);

        builder.record_edge(&home_fp, "Docs", Some(docs_fp.clone()));
        builder.record_edge(&home_fp, "Pricing", Some(pricing_fp));
        builder.record_edge(&home_fp, "Overview", None);

        let map = builder.finish();
        assert_eq!(map.edges()[0].to, Some(docs_fp));
        assert_eq!(map.edges()[1].to, None);
        assert_eq!(map.edges()[2].to, None);
        assert_eq!(map.unresolved_edges().count(), 2);
    }

    #[test]
    fn test_resolve_edge() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record("https://example.com/");
        let home_fp = home.fingerprint().clone();
        let tab = record("https://example.com/?tab=activity");
        let tab_fp = tab.fingerprint().clone();
        builder.add_page(home);
        builder.record_edge(&home_fp, "Activity", None);
        builder.record_edge(&home_fp, "Overview", None);
        builder.add_page(tab);
        builder.resolve_edge(&home_fp, "Activity", &tab_fp);

        let map = builder.finish();
        assert_eq!(map.edges()[0].to, Some(tab_fp));
        assert_eq!(map.edges()[1].to, None);
    }

    #[test]
    fn test_redirected_targets_resolve_to_landing_page() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record("https://example.com/");
        let home_fp = home.fingerprint().clone();
        let login = record("https://example.com/signin");
        let login_fp = login.fingerprint().clone();
        let account_fp = Fingerprint::from_url(&url("https://example.com/account"));
        builder.add_page(home);
        builder.add_page(login);
        builder.record_edge(&home_fp, "Account", Some(account_fp.clone()));
        builder.record_redirect(account_fp, login_fp.clone());

        let map = builder.finish();
        assert_eq!(map.edges()[0].to, Some(login_fp));
    }

    fn record_with_text(s: &str, text: &str) -> PageRecord {
        let u = url(s);
        PageRecord::new(
            Fingerprint::from_url(&u),
            u,
            "Dashboard".to_string(),
            text.to_string(),
            Vec::new(),
            Vec::new(),
            None,
        )
    }

    #[test]
    fn test_tab_views_skip_repeated_content() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record_with_text("https://example.com/", "Overview of the week");
        let home_fp = home.fingerprint().clone();
        let ghost = Fingerprint::from_url(&url("https://example.com/ghost"));
        builder.add_page(home);

        // Default tab shows what the page already shows
        assert!(!builder.add_tab_view(
            &home_fp,
            "Overview",
            "Dashboard",
            "Overview of the week"
        ));
        assert!(builder.add_tab_view(&home_fp, "Activity", "Dashboard", "Recent activity"));
        assert!(!builder.add_tab_view(
            &home_fp,
            "Activity again",
            "Dashboard",
            "Recent activity"
        ));
        assert!(!builder.add_tab_view(&ghost, "Stats", "Ghost", "Numbers"));

        let map = builder.finish();
        assert_eq!(
            map.tab_views(),
            &[TabView {
                from: home_fp,
                label: "Activity".to_string(),
                title: "Dashboard - Activity".to_string(),
                text: "Recent activity".to_string(),
            }]
        );
    }

    #[test]
    fn test_tab_views_compare_only_the_leading_text() {
        let shared = "x".repeat(TAB_TEXT_PREFIX_CHARS);
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record_with_text("https://example.com/", &format!("{}page footer", shared));
        let home_fp = home.fingerprint().clone();
        builder.add_page(home);

        let text = format!("{}tab footer", shared);
        assert!(!builder.add_tab_view(&home_fp, "Details", "Dashboard", &text));
        assert!(builder.finish().tab_views().is_empty());
    }

    #[test]
    fn test_serializes_for_the_generator() {
        let mut builder = SiteMapBuilder::new(url("https://example.com/"), 10);
        let home = record("https://example.com/");
        let home_fp = home.fingerprint().clone();
        builder.add_page(home);
        builder.record_edge(&home_fp, "Home", Some(home_fp.clone()));

        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["home_url"], "https://example.com/");
        assert_eq!(json["pages"][0]["fingerprint"], "https://example.com/");
        assert_eq!(json["edges"][0]["label"], "Home");
        assert_eq!(json["edges"][0]["to"], "https://example.com/");
        assert_eq!(json["tab_views"], serde_json::json!([]));
        assert!(json.get("index").is_none());
    }
}
