use crate::error::{Error, Result};
use crate::fetchers::{FetchedPage, PageFetcher};
use crate::parsers::ParserType;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;

/// Common WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Fetches pages through a browser driven over WebDriver, for sites that render client-side.
///
/// The session is opened on first use and reopened if the driver drops it.
pub struct WebDriverFetcher {
    webdriver_url: String,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str, timeout_secs: u64) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            client: Mutex::new(None),
        }
    }

    /// Connects to the WebDriver instance, trying the fallback endpoints after the configured one
    async fn connect(&self) -> Option<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Some(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
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

    async fn load(&self, client: &Client, url: &str) -> std::result::Result<String, String> {
        let navigate = async {
            client.goto(url).await.map_err(|e| e.to_string())?;
            client.source().await.map_err(|e| e.to_string())
        };
        match tokio::time::timeout(self.timeout, navigate).await {
            Ok(result) => result,
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut guard = self.client.lock().await;

        if guard.is_none() {
            *guard = self.connect().await;
        }
        let Some(client) = guard.as_ref() else {
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: "no WebDriver session available".to_string(),
            });
        };

        match self.load(client, url).await {
            Ok(html) => {
                ::log::debug!("Fetched {} via WebDriver ({} bytes)", url, html.len());
                Ok(FetchedPage {
                    url: url.to_string(),
                    body: html,
                    parser_type: ParserType::Html,
                })
            }
            Err(reason) => {
                if reason.contains("Unable to find session") {
                    ::log::warn!("Lost WebDriver session while accessing {}", url);
                    *guard = None;
                }
                Err(Error::Fetch {
                    url: url.to_string(),
                    reason,
                })
            }
        }
    }

    async fn shutdown(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
