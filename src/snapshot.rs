use crate::error::{ActivationError, FetchError};
use crate::results::InteractiveElement;
use async_trait::async_trait;
use url::Url;

/// DOM snapshot of a rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// URL the browser ended up on (after redirects or client-side routing)
    pub url: Url,

    pub title: String,

    /// Visible text content
    pub text: String,

    /// Buttons, links and tabs anywhere on the page
    pub interactive: Vec<InteractiveElement>,

    /// Elements of the persistent site-wide navigation (nav bars, headers)
    pub nav: Vec<InteractiveElement>,
}

impl RenderedPage {
    /// Whether an element with this label and target is part of the page's nav structure
    pub fn in_nav(&self, element: &InteractiveElement) -> bool {
        self.nav
            .iter()
            .any(|n| n.label == element.label && n.target == element.target)
    }
}

/// Rendering capability the crawler drives
///
/// Implementations own one browser session; calls are sequential and each one
/// must finish before the crawl advances.
#[async_trait]
pub trait PageSnapshotSource: Send {
    /// Load a URL and return its rendered snapshot
    async fn render(&mut self, url: &Url) -> Result<RenderedPage, FetchError>;

    /// Invoke the element labelled `label` on an already rendered page
    async fn activate(
        &mut self,
        page: &RenderedPage,
        label: &str,
    ) -> Result<RenderedPage, ActivationError>;

    /// Release the underlying session
    async fn close(&mut self) {}
}
