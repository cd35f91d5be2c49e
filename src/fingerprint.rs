use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use url::{Url, form_urlencoded};

/// Normalized identity of a page, used as the dedup key for the crawl
///
/// Two URLs that differ only in host case, trailing slashes, fragment or the
/// order of their query parameters share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive the fingerprint of an already parsed URL
    pub fn from_url(url: &Url) -> Self {
        let mut key = String::with_capacity(url.as_str().len());
        key.push_str(url.scheme());
        key.push_str("://");

        // The url crate lowercases hosts for http(s), but not for opaque schemes
        if let Some(host) = url.host_str() {
            key.push_str(&host.to_ascii_lowercase());
        }
        // Default ports are already dropped by the parser
        if let Some(port) = url.port() {
            key.push(':');
            key.push_str(&port.to_string());
        }

        let path = url.path().trim_end_matches('/');
        if path.is_empty() {
            key.push('/');
        } else {
            key.push_str(path);
        }

        let mut params: Vec<(Cow<str>, Cow<str>)> = url.query_pairs().collect();
        if !params.is_empty() {
            // Stable sort keeps repeated keys in their original relative order
            params.sort_by(|a, b| a.0.cmp(&b.0));
            // Re-encode so a decoded '&' or '=' cannot pose as a separator
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&params)
                .finish();
            key.push('?');
            key.push_str(&query);
        }

        Fingerprint(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a URL string and derive its fingerprint
pub fn fingerprint(url: &str) -> Result<Fingerprint, url::ParseError> {
    Url::parse(url).map(|u| Fingerprint::from_url(&u))
}
