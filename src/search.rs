use crate::error::{Error, Result};
use crate::results::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Web search collaborator: one query page in, ordered hits out
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the organic results for `query` on result page `page` (1-based)
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchResult>>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    link: Option<String>,
}

/// Client for the Serper Google search API
pub struct SerperClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Create a client against `base_url`, e.g. `https://google.serper.dev`
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchResult>> {
        let search_error = |reason: String| Error::Search {
            query: query.to_string(),
            page,
            reason,
        };

        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&SearchRequest { q: query, page })
            .send()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(search_error(format!("HTTP {}: {}", status, body)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| search_error(format!("invalid response: {}", e)))?;

        Ok(parsed
            .organic
            .into_iter()
            .filter_map(|hit| hit.link.map(|link| SearchResult::new(hit.title, link)))
            .collect())
    }
}
