use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use url::Url;

/// Kind of an interactive element found on a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Button,
    Link,
    Tab,
}

/// A clickable element with its display label and optional navigation target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// Trimmed, whitespace-collapsed display text
    pub label: String,

    pub kind: ElementKind,

    /// Absolute target URL, or None for purely client-side elements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Url>,
}

impl InteractiveElement {
    pub fn new(label: impl Into<String>, kind: ElementKind, target: Option<Url>) -> Self {
        Self {
            label: label.into(),
            kind,
            target,
        }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(label, ElementKind::Button, None)
    }

    pub fn link(label: impl Into<String>, target: Url) -> Self {
        Self::new(label, ElementKind::Link, Some(target))
    }

    pub fn tab(label: impl Into<String>) -> Self {
        Self::new(label, ElementKind::Tab, None)
    }
}

/// Represents a discovered page of the site map
///
/// Records are created once, on the first successful fetch of a fingerprint,
/// and are read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    fingerprint: Fingerprint,
    url: Url,
    title: String,
    text: String,
    interactive: Vec<InteractiveElement>,
    navigation: Vec<InteractiveElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reached_via: Option<String>,
}

impl PageRecord {
    pub fn new(
        fingerprint: Fingerprint,
        url: Url,
        title: String,
        text: String,
        interactive: Vec<InteractiveElement>,
        navigation: Vec<InteractiveElement>,
        reached_via: Option<String>,
    ) -> Self {
        Self {
            fingerprint,
            url,
            title,
            text,
            interactive,
            navigation,
            reached_via,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// URL the page was rendered from
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Visible text, whitespace-normalized
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Every interactive element of the page, in document order
    pub fn interactive(&self) -> &[InteractiveElement] {
        &self.interactive
    }

    /// Navigation candidates discovered on this page
    pub fn navigation(&self) -> &[InteractiveElement] {
        &self.navigation
    }

    /// Label of the element activated to reach this page, if it was not fetched directly
    pub fn reached_via(&self) -> Option<&str> {
        self.reached_via.as_deref()
    }
}
