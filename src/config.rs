use crate::crawlers::CrawlSettings;
use crate::error::ConfigError;
use crate::filter::UrlFilterConfig;
use crate::parsers::SnapshotLimits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for a site discovery run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start discovery from; may be left out and supplied on the command line
    #[serde(default)]
    pub seed_url: String,

    /// Maximum number of pages recorded in the site map
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Timeout for each page render or element activation, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Pause after each navigation or click so client-side rendering can finish
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Client-side tabs followed per page
    #[serde(default = "default_max_tabs_per_page")]
    pub max_tabs_per_page: usize,

    /// Characters of visible text kept per page
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Interactive elements kept per page
    #[serde(default = "default_max_interactive")]
    pub max_interactive: usize,

    /// Navigation items kept per page
    #[serde(default = "default_max_nav_items")]
    pub max_nav_items: usize,

    /// Crawl scope rules
    #[serde(default)]
    pub scope: UrlFilterConfig,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

fn default_max_pages() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_max_tabs_per_page() -> usize {
    5
}

fn default_max_text_chars() -> usize {
    SnapshotLimits::default().max_text_chars
}

fn default_max_interactive() -> usize {
    SnapshotLimits::default().max_interactive
}

fn default_max_nav_items() -> usize {
    SnapshotLimits::default().max_nav_items
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(seed_url: &str) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            max_pages: default_max_pages(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            max_tabs_per_page: default_max_tabs_per_page(),
            max_text_chars: default_max_text_chars(),
            max_interactive: default_max_interactive(),
            max_nav_items: default_max_nav_items(),
            scope: UrlFilterConfig::default(),
            webdriver_url: default_webdriver_url(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn snapshot_limits(&self) -> SnapshotLimits {
        SnapshotLimits {
            max_text_chars: self.max_text_chars,
            max_interactive: self.max_interactive,
            max_nav_items: self.max_nav_items,
            ..SnapshotLimits::default()
        }
    }

    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            fetch_timeout: self.fetch_timeout(),
            max_tabs_per_page: self.max_tabs_per_page,
            filter: self.scope.clone(),
        }
    }
}
