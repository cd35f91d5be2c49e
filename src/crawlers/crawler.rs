use crate::discover::NavigationDiscoverer;
use crate::error::{ActivationError, CrawlError, FetchError};
use crate::filter::{UrlFilter, UrlFilterConfig};
use crate::fingerprint::Fingerprint;
use crate::frontier::{CrawlFrontier, FrontierEntry};
use crate::results::PageRecord;
use crate::sitemap::{SiteMap, SiteMapBuilder};
use crate::snapshot::{PageSnapshotSource, RenderedPage};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use url::Url;

/// Default per-call timeout for rendering or activating
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs of a single crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Upper bound for each render or activation
    pub fetch_timeout: Duration,
    /// Client-side tabs followed per page
    pub max_tabs_per_page: usize,
    /// Crawl scope; the host is taken from the seed page
    pub filter: UrlFilterConfig,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_tabs_per_page: 5,
            filter: UrlFilterConfig::default(),
        }
    }
}

/// Why a frontier entry produced no page
#[derive(Debug, Error)]
enum EntryFailure {
    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    #[error("activation failed: {0}")]
    Activation(ActivationError),
}

/// Mutable state of one crawl
struct Survey {
    filter: Arc<UrlFilter>,
    frontier: CrawlFrontier,
    builder: SiteMapBuilder,
    discoverer: NavigationDiscoverer,
}

impl Survey {
    /// Record a newly rendered page and queue its navigation candidates
    fn admit(&mut self, page: RenderedPage, reached_via: Option<String>) -> Fingerprint {
        let fp = Fingerprint::from_url(&page.url);
        self.frontier.mark_visited(fp.clone());

        let candidates = self.discoverer.discover(&page);
        let RenderedPage {
            url,
            title,
            text,
            interactive,
            ..
        } = page;

        ::log::info!(
            "[{}] {} ({} candidates)",
            self.builder.len() + 1,
            url,
            candidates.len()
        );

        let record = PageRecord::new(
            fp.clone(),
            url,
            title,
            text,
            interactive,
            candidates.clone(),
            reached_via,
        );
        self.builder.add_page(record);

        for candidate in candidates {
            let entry = match candidate.target {
                Some(target) => {
                    self.builder.record_edge(
                        &fp,
                        &candidate.label,
                        Some(Fingerprint::from_url(&target)),
                    );
                    FrontierEntry::direct(target)
                }
                None => {
                    self.builder.record_edge(&fp, &candidate.label, None);
                    FrontierEntry::activate(fp.clone(), candidate.label)
                }
            };
            if self.frontier.push(entry) {
                ::log::trace!("Queued candidate from {}", fp);
            }
        }

        fp
    }
}

/// Breadth-first site discovery over a snapshot source
///
/// The crawler owns its source for the lifetime of the crawl and closes it
/// when the crawl ends.
pub struct Crawler<S: PageSnapshotSource> {
    source: S,
    settings: CrawlSettings,
}

impl<S: PageSnapshotSource> Crawler<S> {
    pub fn new(source: S) -> Self {
        Self::with_settings(source, CrawlSettings::default())
    }

    pub fn with_settings(source: S, settings: CrawlSettings) -> Self {
        Self { source, settings }
    }

    /// Crawl from `seed` until the frontier runs dry or `max_pages` pages are recorded
    ///
    /// Only an unusable seed is fatal; any other failed entry is logged and skipped.
    pub async fn crawl(mut self, seed: &str, max_pages: usize) -> Result<SiteMap, CrawlError> {
        let result = self.run(seed, max_pages).await;
        self.source.close().await;
        result
    }

    async fn run(&mut self, seed: &str, max_pages: usize) -> Result<SiteMap, CrawlError> {
        let seed_url = Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;
        if max_pages == 0 {
            return Err(CrawlError::InvalidBudget);
        }

        ::log::info!("Starting site discovery at {} (max {} pages)", seed_url, max_pages);

        let mut frontier = CrawlFrontier::seeded(seed_url.clone());
        // The seed is rendered up front: it fixes the crawl scope and its failure is fatal
        frontier.pop_next();
        let seed_page = self
            .render(&seed_url)
            .await
            .map_err(CrawlError::SeedUnreachable)?;

        let filter = Arc::new(UrlFilter::for_seed(
            &seed_page.url,
            self.settings.filter.clone(),
        )?);
        let mut survey = Survey {
            filter: Arc::clone(&filter),
            frontier,
            builder: SiteMapBuilder::new(seed_url.clone(), max_pages),
            discoverer: NavigationDiscoverer::new(filter, self.settings.max_tabs_per_page),
        };

        let landed = survey.admit(seed_page, None);
        survey
            .builder
            .record_redirect(Fingerprint::from_url(&seed_url), landed);

        while !survey.builder.is_full() {
            let Some(entry) = survey.frontier.pop_next() else {
                break;
            };

            let (page, reached_via) = match self.resolve(&entry, &survey.builder).await {
                Ok(resolved) => resolved,
                Err(failure) => {
                    ::log::warn!("Skipping {:?}: {}", entry, failure);
                    continue;
                }
            };

            let fp = Fingerprint::from_url(&page.url);

            match &entry {
                FrontierEntry::Activate { source, label } => {
                    if &fp == source {
                        // Same-page tab: content changed but the page identity did not
                        if survey
                            .builder
                            .add_tab_view(source, label, &page.title, &page.text)
                        {
                            ::log::info!("Captured tab {:?} on {}", label, source);
                        }
                        continue;
                    }
                    if survey.frontier.is_visited(&fp) {
                        survey.builder.resolve_edge(source, label, &fp);
                        ::log::debug!("Activating {:?} led back to {}", label, fp);
                        continue;
                    }
                }
                FrontierEntry::Direct { url } => {
                    survey
                        .builder
                        .record_redirect(Fingerprint::from_url(url), fp.clone());
                    if survey.frontier.is_visited(&fp) {
                        ::log::debug!("{} landed on already visited {}", url, fp);
                        continue;
                    }
                }
            }

            if !survey.filter.in_scope(&page.url) {
                ::log::warn!("Skipping {}: outside the crawl scope", page.url);
                continue;
            }

            let landed = survey.admit(page, reached_via);
            if let FrontierEntry::Activate { source, label } = &entry {
                survey.builder.resolve_edge(source, label, &landed);
            }
        }

        if survey.builder.is_full() && !survey.frontier.is_empty() {
            ::log::info!(
                "Page budget of {} reached with {} entries left in the frontier",
                max_pages,
                survey.frontier.len()
            );
        }

        let site_map = survey.builder.finish();
        ::log::info!(
            "Discovery complete: {} pages, {} tab views, {} edges ({} unresolved)",
            site_map.len(),
            site_map.tab_views().len(),
            site_map.edges().len(),
            site_map.unresolved_edges().count()
        );
        Ok(site_map)
    }

    /// Turn a frontier entry into a rendered page
    async fn resolve(
        &mut self,
        entry: &FrontierEntry,
        builder: &SiteMapBuilder,
    ) -> Result<(RenderedPage, Option<String>), EntryFailure> {
        match entry {
            FrontierEntry::Direct { url } => self
                .render(url)
                .await
                .map(|page| (page, None))
                .map_err(EntryFailure::Fetch),
            FrontierEntry::Activate { source, label } => {
                let source_url = builder
                    .get(source)
                    .map(|record| record.url().clone())
                    .ok_or_else(|| {
                        EntryFailure::Activation(ActivationError::SourceUnavailable(
                            FetchError::InvalidUrl(source.to_string()),
                        ))
                    })?;
                let source_page = self
                    .render(&source_url)
                    .await
                    .map_err(|e| EntryFailure::Activation(e.into()))?;
                self.activate(&source_page, label)
                    .await
                    .map(|page| (page, Some(label.clone())))
                    .map_err(EntryFailure::Activation)
            }
        }
    }

    async fn render(&mut self, url: &Url) -> Result<RenderedPage, FetchError> {
        ::log::debug!("Rendering {}", url);
        match timeout(self.settings.fetch_timeout, self.source.render(url)).await {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("Timeout rendering: {}", url);
                Err(FetchError::Timeout)
            }
        }
    }

    async fn activate(
        &mut self,
        page: &RenderedPage,
        label: &str,
    ) -> Result<RenderedPage, ActivationError> {
        ::log::debug!("Activating {:?} on {}", label, page.url);
        match timeout(self.settings.fetch_timeout, self.source.activate(page, label)).await {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("Timeout activating {:?} on {}", label, page.url);
                Err(ActivationError::Timeout)
            }
        }
    }
}
