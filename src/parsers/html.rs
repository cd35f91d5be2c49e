use crate::parsers::text::{self, TextOptions};
use crate::results::{ElementKind, InteractiveElement};
use crate::snapshot::RenderedPage;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Caps applied while extracting a snapshot
#[derive(Debug, Clone, Copy)]
pub struct SnapshotLimits {
    pub max_text_chars: usize,
    pub max_interactive: usize,
    pub max_nav_items: usize,
    /// Labels must be strictly shorter than this
    pub max_label_len: usize,
    /// Nav labels must be strictly shorter than this
    pub max_nav_label_len: usize,
}

impl Default for SnapshotLimits {
    fn default() -> Self {
        Self {
            max_text_chars: 15_000,
            max_interactive: 50,
            max_nav_items: 20,
            max_label_len: 100,
            max_nav_label_len: 50,
        }
    }
}

const INTERACTIVE_SELECTOR: &str =
    "button, a, [role=\"button\"], [role=\"tab\"], [data-tab], .tab";
const NAV_LINK_SELECTOR: &str = "nav a, [role=\"navigation\"] a, header a";
const NAV_TAB_SELECTOR: &str = "[role=\"tab\"], [role=\"tablist\"] button";
const HIDDEN_TEXT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should be valid")
}

/// Parses rendered HTML into a page snapshot
///
/// `page_url` is the URL the browser reports for the document; relative hrefs
/// are resolved against it.
pub fn parse_snapshot(html: &str, page_url: &Url, limits: &SnapshotLimits) -> RenderedPage {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&selector("title"))
        .next()
        .map(|t| text::collapse_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default();

    let text_options = TextOptions {
        preserve_paragraphs: true,
        max_chars: Some(limits.max_text_chars),
    };
    let text = text::normalize(&visible_text(&doc), &text_options);

    let interactive = extract_interactive(&doc, page_url, limits);
    let nav = extract_nav(&doc, page_url, limits);

    ::log::debug!(
        "Snapshot of {}: {} interactive elements, {} nav items",
        page_url,
        interactive.len(),
        nav.len()
    );

    RenderedPage {
        url: page_url.clone(),
        title,
        text,
        interactive,
        nav,
    }
}

/// Collects body text, skipping script and style content
pub fn visible_text(doc: &Html) -> String {
    let Some(body) = doc.select(&selector("body")).next() else {
        return String::new();
    };

    body.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TEXT_TAGS.contains(&e.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_interactive(
    doc: &Html,
    page_url: &Url,
    limits: &SnapshotLimits,
) -> Vec<InteractiveElement> {
    doc.select(&selector(INTERACTIVE_SELECTOR))
        .filter_map(|el| {
            let label = element_label(&el, limits.max_label_len)?;
            let kind = element_kind(&el);
            let target = match kind {
                ElementKind::Button => None,
                _ => resolve_href(&el, page_url),
            };
            Some(InteractiveElement::new(label, kind, target))
        })
        .take(limits.max_interactive)
        .collect()
}

fn extract_nav(doc: &Html, page_url: &Url, limits: &SnapshotLimits) -> Vec<InteractiveElement> {
    let link_selector = selector(NAV_LINK_SELECTOR);
    let tab_selector = selector(NAV_TAB_SELECTOR);

    let links = doc.select(&link_selector).filter_map(|el| {
        let label = element_label(&el, limits.max_nav_label_len)?;
        // Nav links without a usable href are left to the tab pass
        let target = resolve_href(&el, page_url)?;
        Some(InteractiveElement::link(label, target))
    });
    let tabs = doc.select(&tab_selector).filter_map(|el| {
        let label = element_label(&el, limits.max_nav_label_len)?;
        Some(InteractiveElement::new(
            label,
            ElementKind::Tab,
            resolve_href(&el, page_url),
        ))
    });

    let mut nav: Vec<InteractiveElement> = Vec::new();
    for item in links.chain(tabs) {
        if nav.len() >= limits.max_nav_items {
            break;
        }
        if !nav.contains(&item) {
            nav.push(item);
        }
    }
    nav
}

fn element_kind(el: &ElementRef) -> ElementKind {
    let value = el.value();
    if value.attr("role") == Some("tab")
        || value.attr("data-tab").is_some()
        || value.classes().any(|c| c == "tab")
    {
        ElementKind::Tab
    } else if value.name() == "a" {
        ElementKind::Link
    } else {
        ElementKind::Button
    }
}

fn element_label(el: &ElementRef, max_len: usize) -> Option<String> {
    let raw = el.text().collect::<Vec<_>>().join(" ");
    text::normalize_label(&raw, max_len)
        .or_else(|| text::normalize_label(el.value().attr("aria-label")?, max_len))
}

/// Resolves an element's href to an absolute http(s) URL
///
/// Pure in-page anchors and script pseudo-links resolve to None.
fn resolve_href(el: &ElementRef, page_url: &Url) -> Option<Url> {
    let href = el.value().attr("href")?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let resolved = page_url.join(href).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}
