use crate::error::{ActivationError, CrawlError, FetchError};
use crate::parsers::text::{self, TextOptions};
use crate::parsers::{SnapshotLimits, parse_snapshot};
use crate::snapshot::{PageSnapshotSource, RenderedPage};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use url::Url;

/// Endpoints tried when the configured WebDriver URL refuses the connection
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

const INNER_TEXT_SCRIPT: &str = "return document.body ? document.body.innerText : '';";

/// Snapshot source backed by a WebDriver session
pub struct WebDriverSource {
    client: Option<Client>,
    webdriver_url: String,
    limits: SnapshotLimits,
    settle_delay: Duration,
}

impl WebDriverSource {
    /// Connects to the WebDriver instance, falling back to common local endpoints
    pub async fn connect(
        webdriver_url: &str,
        limits: SnapshotLimits,
        settle_delay: Duration,
    ) -> Result<Self, CrawlError> {
        let client = connect_to_webdriver(webdriver_url).await.ok_or_else(|| {
            CrawlError::Connect(format!(
                "no WebDriver server reachable at {} or the fallback endpoints",
                webdriver_url
            ))
        })?;

        Ok(Self {
            client: Some(client),
            webdriver_url: webdriver_url.to_string(),
            limits,
            settle_delay,
        })
    }

    fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Attempts to replace a lost WebDriver session
    async fn attempt_reconnect(&mut self) -> bool {
        ::log::warn!("Attempting to reconnect WebDriver session");
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(new_client) => {
                self.client = Some(new_client);
                ::log::info!("Successfully reconnected to WebDriver");
                true
            }
            Err(e) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", e);
                false
            }
        }
    }

    async fn load(&self, url: &Url) -> Result<RenderedPage, FetchError> {
        let client = self.client().ok_or_else(session_closed)?;
        goto(client, url, self.settle_delay)
            .await
            .map_err(|e| navigation_error(url, e))?;
        snapshot(client, &self.limits)
            .await
            .map_err(|e| navigation_error(url, e))
    }
}

async fn goto(client: &Client, url: &Url, settle_delay: Duration) -> Result<(), CmdError> {
    client.goto(url.as_str()).await?;
    // Give client-side rendering a moment to settle
    tokio::time::sleep(settle_delay).await;
    Ok(())
}

/// Captures the page the browser currently shows
async fn snapshot(client: &Client, limits: &SnapshotLimits) -> Result<RenderedPage, CmdError> {
    let current_url = client.current_url().await?;
    let html = client.source().await?;
    let mut page = parse_snapshot(&html, &current_url, limits);

    // innerText honours CSS visibility, so prefer it over the parsed DOM text
    match client.execute(INNER_TEXT_SCRIPT, Vec::new()).await {
        Ok(serde_json::Value::String(inner)) => {
            let options = TextOptions {
                preserve_paragraphs: true,
                max_chars: Some(limits.max_text_chars),
            };
            page.text = text::normalize(&inner, &options);
        }
        Ok(_) => {}
        Err(e) => ::log::debug!("innerText unavailable on {}: {}", current_url, e),
    }

    Ok(page)
}

async fn click_label(client: &Client, label: &str, settle_delay: Duration) -> Result<(), CmdError> {
    let xpath = clickable_xpath(label);
    let element = client.find(Locator::XPath(&xpath)).await?;
    element.click().await?;
    tokio::time::sleep(settle_delay).await;
    Ok(())
}

#[async_trait]
impl PageSnapshotSource for WebDriverSource {
    async fn render(&mut self, url: &Url) -> Result<RenderedPage, FetchError> {
        let first = self.load(url).await;
        match first {
            Err(FetchError::Navigation { reason, .. }) if is_session_lost(&reason) => {
                ::log::warn!("Lost session while loading {}", url);
                if !self.attempt_reconnect().await {
                    return Err(FetchError::WebDriver(reason));
                }
                self.load(url).await
            }
            result => result,
        }
    }

    async fn activate(
        &mut self,
        page: &RenderedPage,
        label: &str,
    ) -> Result<RenderedPage, ActivationError> {
        let client = self
            .client()
            .ok_or_else(|| ActivationError::SourceUnavailable(session_closed()))?;

        // Make sure the browser shows the page the element belongs to
        let on_page = client.current_url().await.ok().as_ref() == Some(&page.url);
        if !on_page {
            goto(client, &page.url, self.settle_delay)
                .await
                .map_err(|e| ActivationError::SourceUnavailable(navigation_error(&page.url, e)))?;
        }

        if let Err(e) = click_label(client, label, self.settle_delay).await {
            if is_no_such_element(&e) {
                return Err(ActivationError::ElementNotFound(label.to_string()));
            }
            return Err(ActivationError::WebDriver(e.to_string()));
        }

        let after = snapshot(client, &self.limits)
            .await
            .map_err(|e| ActivationError::WebDriver(e.to_string()))?;

        if after.url == page.url && after.text == page.text {
            return Err(ActivationError::NoChange(label.to_string()));
        }
        Ok(after)
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}

fn is_session_lost(reason: &str) -> bool {
    reason.contains("Unable to find session") || reason.contains("invalid session id")
}

fn session_closed() -> FetchError {
    FetchError::WebDriver("session closed".to_string())
}

fn is_no_such_element(error: &CmdError) -> bool {
    error.to_string().to_lowercase().contains("no such element")
}

fn navigation_error(url: &Url, error: CmdError) -> FetchError {
    FetchError::Navigation {
        url: url.to_string(),
        reason: error.to_string(),
    }
}

/// XPath selecting a clickable element by its normalized text or aria-label
pub fn clickable_xpath(label: &str) -> String {
    let literal = xpath_literal(label);
    format!(
        "//*[self::a or self::button or @role='button' or @role='tab' or @data-tab \
         or contains(concat(' ', normalize-space(@class), ' '), ' tab ')]\
         [normalize-space(.)={lit} or normalize-space(@aria-label)={lit}]",
        lit = literal
    )
}

/// Quotes a string as an XPath 1.0 literal
fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{}\"", s)
    } else if !s.contains('\'') {
        format!("'{}'", s)
    } else {
        let parts = s
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect::<Vec<_>>()
            .join(", '\"', ");
        format!("concat({})", parts)
    }
}
