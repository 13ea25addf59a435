pub mod http;
pub mod webdriver;

use crate::config::{FetchBackend, FinderConfig};
use crate::error::Result;
use crate::parsers::{Parser, ParserType};
use async_trait::async_trait;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

/// Raw body of a fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL of the page
    pub url: String,
    /// Body as returned by the server or browser
    pub body: String,
    /// How the body should be parsed
    pub parser_type: ParserType,
}

/// Retrieves pages. Failures come back as `Error::Fetch`, never as panics.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page body
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Fetch the raw HTML of a page
    async fn fetch_html(&self, url: &str) -> Result<String> {
        Ok(self.fetch(url).await?.body)
    }

    /// Fetch a page and return its main text truncated to `max_chars` characters
    async fn fetch_text(&self, url: &str, max_chars: usize) -> Result<String> {
        let page = self.fetch(url).await?;
        Ok(Parser::main_text(&page.body, page.parser_type, max_chars))
    }

    /// Release any session held by the fetcher
    async fn shutdown(&self) {}
}

/// Builds the fetcher selected in the configuration
pub fn from_config(config: &FinderConfig) -> Result<Box<dyn PageFetcher>> {
    match config.fetch_backend {
        FetchBackend::Http => Ok(Box::new(HttpFetcher::new(config.fetch_timeout_secs)?)),
        FetchBackend::Webdriver => Ok(Box::new(WebDriverFetcher::new(
            &config.webdriver_url,
            config.fetch_timeout_secs,
        ))),
    }
}
