pub mod config;
pub mod crawlers;
pub mod discover;
pub mod error;
pub mod filter;
pub mod fingerprint;
pub mod frontier;
pub mod parsers;
pub mod results;
pub mod sitemap;
pub mod snapshot;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use crawlers::{CrawlSettings, Crawler, WebDriverSource};
pub use error::{ActivationError, ConfigError, CrawlError, FetchError};
pub use fingerprint::{Fingerprint, fingerprint};
pub use results::{ElementKind, InteractiveElement, PageRecord};
pub use sitemap::{NavigationEdge, SiteMap, TabView};
pub use snapshot::{PageSnapshotSource, RenderedPage};

/// Main builder for surveying a web application
pub struct SiteSurvey {
    config: CrawlConfig,
}

impl SiteSurvey {
    /// Create a new SiteSurvey builder starting at the given URL
    pub fn new(seed_url: &str) -> Self {
        Self {
            config: CrawlConfig::new(seed_url),
        }
    }

    /// Set the maximum number of pages recorded in the site map
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the timeout for each page render or element activation
    pub fn with_fetch_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.fetch_timeout_secs = timeout_seconds;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.config.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Replace the configuration; the builder's seed URL wins unless it is empty
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        let seed_url = std::mem::take(&mut self.config.seed_url);
        self.config = config;
        if !seed_url.is_empty() {
            self.config.seed_url = seed_url;
        }
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(
        self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CrawlConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Connect to WebDriver and crawl the site
    pub async fn crawl(self) -> Result<SiteMap, Box<dyn std::error::Error>> {
        let mut config = self.config;

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                config.webdriver_url = webdriver_url;
            }
        }

        let source = WebDriverSource::connect(
            &config.webdriver_url,
            config.snapshot_limits(),
            config.settle_delay(),
        )
        .await?;

        let crawler = Crawler::with_settings(source, config.crawl_settings());
        let site_map = crawler.crawl(&config.seed_url, config.max_pages).await?;
        Ok(site_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let survey = SiteSurvey::new("https://app.test/")
            .with_max_pages(4)
            .with_fetch_timeout(7)
            .with_webdriver_url("http://localhost:9515");
        assert_eq!(survey.config().max_pages, 4);
        assert_eq!(survey.config().fetch_timeout_secs, 7);
        assert_eq!(survey.config().webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_config_str_keeps_builder_seed() {
        let survey = SiteSurvey::new("https://app.test/")
            .with_config_str(r#"{"seed_url": "https://other.test/", "max_pages": 2}"#)
            .unwrap();
        assert_eq!(survey.config().seed_url, "https://app.test/");
        assert_eq!(survey.config().max_pages, 2);

        let survey = SiteSurvey::new("")
            .with_config_str(r#"{"seed_url": "https://other.test/"}"#)
            .unwrap();
        assert_eq!(survey.config().seed_url, "https://other.test/");
    }

    #[test]
    fn test_config_str_rejects_bad_json() {
        assert!(SiteSurvey::new("https://app.test/").with_config_str("{").is_err());
    }
}
