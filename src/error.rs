use thiserror::Error;

/// A page could not be rendered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out rendering page")]
    Timeout,

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// A navigation element could not be invoked, or invoking it changed nothing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("timed out activating element")]
    Timeout,

    #[error("no element labelled {0:?}")]
    ElementNotFound(String),

    #[error("activating {0:?} produced no observable page change")]
    NoChange(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("source page unavailable: {0}")]
    SourceUnavailable(#[from] FetchError),
}

/// Failures that abort a crawl; everything else only degrades the site map
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("invalid seed URL {url}: {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("page budget must be at least 1")]
    InvalidBudget,

    #[error("seed page could not be fetched: {0}")]
    SeedUnreachable(#[source] FetchError),

    #[error("could not connect to WebDriver: {0}")]
    Connect(String),

    #[error("invalid crawl configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}
