use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

/// Asset URLs that never render as navigable pages
pub const DEFAULT_ASSET_PATTERN: &str =
    r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$";

/// Labels of elements that must never be invoked by the crawler
pub const DEFAULT_DESTRUCTIVE_LABELS: &[&str] = &[
    r"\blog ?out\b",
    r"\bsign ?out\b",
    r"\bdelete\b",
    r"\bremove\b",
    r"\bunsubscribe\b",
    r"\bdeactivate\b",
    r"\bcancel (my )?(account|subscription|plan)\b",
];

/// Configuration for the crawl scope
///
/// Fields left out of a config file keep their default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlFilterConfig {
    /// Whether pages on other hosts may be crawled
    pub allow_external: bool,

    /// Host (with explicit port, if any) every crawled URL must share
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_host: Option<String>,

    /// Path prefix restriction (if None, all paths are allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_path_prefix: Option<String>,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    pub exclude_patterns: Vec<String>,

    /// Case-insensitive regex patterns for element labels that are never followed
    pub destructive_labels: Vec<String>,
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            allow_external: false,
            required_host: None,
            required_path_prefix: None,
            include_patterns: Vec::new(),
            exclude_patterns: vec![DEFAULT_ASSET_PATTERN.to_string()],
            destructive_labels: DEFAULT_DESTRUCTIVE_LABELS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Decides which URLs belong to the crawl and which labels are unsafe to invoke
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
    destructive_regexes: Vec<Regex>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(UrlFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, ConfigError> {
        let include_regexes = compile(&config.include_patterns, false)?;
        let exclude_regexes = compile(&config.exclude_patterns, false)?;
        let destructive_regexes = compile(&config.destructive_labels, true)?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
            destructive_regexes,
        })
    }

    /// Scope a crawl to the seed's host
    pub fn for_seed(seed: &Url, mut config: UrlFilterConfig) -> Result<Self, ConfigError> {
        if !config.allow_external && config.required_host.is_none() {
            config.required_host = host_key(seed);
        }
        Self::new(config)
    }

    /// Whether a URL belongs to the crawl
    pub fn in_scope(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_in_host_scope(url) || !self.is_in_path_scope(url) {
            return false;
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(url_str))
    }

    /// Whether invoking an element with this label could destroy state
    pub fn is_destructive(&self, label: &str) -> bool {
        self.destructive_regexes.iter().any(|r| r.is_match(label))
    }

    fn is_in_host_scope(&self, url: &Url) -> bool {
        match &self.config.required_host {
            Some(required) => host_key(url).as_deref() == Some(required.as_str()),
            None => self.config.allow_external,
        }
    }

    fn is_in_path_scope(&self, url: &Url) -> bool {
        match &self.config.required_path_prefix {
            Some(prefix) => url.path().starts_with(prefix),
            None => true,
        }
    }
}

fn compile(patterns: &[String], case_insensitive: bool) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(ConfigError::from)
        })
        .collect()
}

/// Lowercased host plus explicit port, e.g. `app.example.com:8080`
fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_filter_rejects_everything_without_host() {
        let filter = UrlFilter::default();
        assert!(!filter.in_scope(&url("https://example.com/page")));
    }

    #[test]
    fn test_seed_host_scope() {
        let seed = url("https://App.Example.com/dashboard");
        let filter = UrlFilter::for_seed(&seed, UrlFilterConfig::default()).unwrap();

        assert!(filter.in_scope(&url("https://app.example.com/settings")));
        assert!(filter.in_scope(&url("http://app.example.com/settings")));
        assert!(!filter.in_scope(&url("https://example.com/settings")));
        assert!(!filter.in_scope(&url("https://app.example.com:8443/settings")));
        assert!(!filter.in_scope(&url("mailto:team@app.example.com")));
    }

    #[test]
    fn test_assets_are_excluded() {
        let seed = url("https://example.com/");
        let filter = UrlFilter::for_seed(&seed, UrlFilterConfig::default()).unwrap();
        assert!(!filter.in_scope(&url("https://example.com/logo.png")));
        assert!(!filter.in_scope(&url("https://example.com/terms.pdf")));
        assert!(filter.in_scope(&url("https://example.com/pricing")));
    }

    #[test]
    fn test_allow_external() {
        let config = UrlFilterConfig {
            allow_external: true,
            ..UrlFilterConfig::default()
        };
        let filter = UrlFilter::for_seed(&url("https://example.com/"), config).unwrap();
        assert!(filter.in_scope(&url("https://other.org/page")));
    }

    #[test]
    fn test_path_and_regex_patterns() {
        let config = UrlFilterConfig {
            required_path_prefix: Some("/app".to_string()),
            include_patterns: vec![r"/app/(reports|settings)".to_string()],
            exclude_patterns: vec![r"/app/settings/billing".to_string()],
            ..UrlFilterConfig::default()
        };
        let filter = UrlFilter::for_seed(&url("https://example.com/app"), config).unwrap();

        assert!(filter.in_scope(&url("https://example.com/app/reports")));
        assert!(!filter.in_scope(&url("https://example.com/app/inbox")));
        assert!(!filter.in_scope(&url("https://example.com/app/settings/billing")));
        assert!(!filter.in_scope(&url("https://example.com/blog/reports")));
    }

    #[test]
    fn test_destructive_labels() {
        let filter = UrlFilter::default();
        assert!(filter.is_destructive("Log out"));
        assert!(filter.is_destructive("LOGOUT"));
        assert!(filter.is_destructive("Sign Out"));
        assert!(filter.is_destructive("Delete project"));
        assert!(filter.is_destructive("Cancel subscription"));
        assert!(!filter.is_destructive("Reports"));
        assert!(!filter.is_destructive("Blog"));
        assert!(!filter.is_destructive("Cancel"));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = UrlFilterConfig {
            exclude_patterns: vec!["(unclosed".to_string()],
            ..UrlFilterConfig::default()
        };
        assert!(matches!(UrlFilter::new(config), Err(ConfigError::Regex(_))));
    }
}
