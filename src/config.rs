use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How pages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Plain HTTP GET
    #[default]
    Http,
    /// Rendered through a WebDriver session
    Webdriver,
}

/// Configuration for a discovery run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Places to search, e.g. "Manchester UK"
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// Search terms, e.g. "foodbank"
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,

    /// Query templates with `{term}` and `{location}` placeholders
    #[serde(default = "default_query_templates")]
    pub query_templates: Vec<String>,

    /// Search result pages to request per query
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: u32,

    /// Search results processed per (location, term) pair
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Expanded links followed per directory page
    #[serde(default = "default_max_directory_links")]
    pub max_directory_links: usize,

    /// Pause after each search result, in milliseconds
    #[serde(default = "default_result_delay_ms")]
    pub result_delay_ms: u64,

    /// Pause after each expanded directory link, in milliseconds
    #[serde(default = "default_link_delay_ms")]
    pub link_delay_ms: u64,

    /// Page fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Characters of main text kept per fetched page
    #[serde(default = "default_page_text_limit")]
    pub page_text_limit: usize,

    /// Characters of page text sent for classification
    #[serde(default = "default_classify_text_limit")]
    pub classify_text_limit: usize,

    /// Characters of page text sent for record extraction
    #[serde(default = "default_extract_text_limit")]
    pub extract_text_limit: usize,

    /// URL substrings that mark a page as a directory without asking the model
    #[serde(default = "default_directory_url_indicators")]
    pub directory_url_indicators: Vec<String>,

    /// Chat model used for classification and extraction
    #[serde(default = "default_model")]
    pub model: String,

    /// Page fetching backend
    #[serde(default)]
    pub fetch_backend: FetchBackend,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Base URL of the search API
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Base URL of the chat completion API
    #[serde(default = "default_model_endpoint")]
    pub model_endpoint: String,
}

fn default_locations() -> Vec<String> {
    vec!["Manchester UK".to_string()]
}

fn default_terms() -> Vec<String> {
    vec!["foodbank".to_string()]
}

fn default_query_templates() -> Vec<String> {
    vec!["{term} {location} -Trussell".to_string()]
}

fn default_max_search_pages() -> u32 {
    3
}

fn default_max_results() -> usize {
    30
}

fn default_max_directory_links() -> usize {
    5
}

fn default_result_delay_ms() -> u64 {
    2000
}

fn default_link_delay_ms() -> u64 {
    1000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_page_text_limit() -> usize {
    9000
}

fn default_classify_text_limit() -> usize {
    3000
}

fn default_extract_text_limit() -> usize {
    6000
}

fn default_directory_url_indicators() -> Vec<String> {
    [
        "yelp",
        "search",
        "list",
        "directory",
        "find",
        "best",
        "top",
        "review",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev".to_string()
}

fn default_model_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            terms: default_terms(),
            query_templates: default_query_templates(),
            max_search_pages: default_max_search_pages(),
            max_results: default_max_results(),
            max_directory_links: default_max_directory_links(),
            result_delay_ms: default_result_delay_ms(),
            link_delay_ms: default_link_delay_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            page_text_limit: default_page_text_limit(),
            classify_text_limit: default_classify_text_limit(),
            extract_text_limit: default_extract_text_limit(),
            directory_url_indicators: default_directory_url_indicators(),
            model: default_model(),
            fetch_backend: FetchBackend::default(),
            webdriver_url: default_webdriver_url(),
            search_endpoint: default_search_endpoint(),
            model_endpoint: default_model_endpoint(),
        }
    }
}

impl FinderConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .map_err(|e| Error::Config(format!("cannot open {}: {}", path.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }

    /// Search queries for one (location, term) pair
    pub fn queries_for(&self, location: &str, term: &str) -> Vec<String> {
        self.query_templates
            .iter()
            .map(|t| t.replace("{term}", term).replace("{location}", location))
            .collect()
    }
}

/// API keys for the search and language model services
#[derive(Clone)]
pub struct Credentials {
    pub search_api_key: String,
    pub model_api_key: String,
}

impl Credentials {
    pub const SEARCH_KEY_VAR: &'static str = "SERPER_API_KEY";
    pub const MODEL_KEY_VAR: &'static str = "OPENAI_API_KEY";

    /// Read both keys from the environment, after loading `.env` if present.
    ///
    /// Fails naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} is not set", name)))
        };

        Ok(Self {
            search_api_key: require(Self::SEARCH_KEY_VAR)?,
            model_api_key: require(Self::MODEL_KEY_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"***")
            .field("model_api_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = FinderConfig::from_json("{}").unwrap();
        assert_eq!(config.locations, vec!["Manchester UK"]);
        assert_eq!(config.terms, vec!["foodbank"]);
        assert_eq!(config.max_search_pages, 3);
        assert_eq!(config.max_results, 30);
        assert_eq!(config.max_directory_links, 5);
        assert_eq!(config.fetch_backend, FetchBackend::Http);
        assert!(config.directory_url_indicators.contains(&"yelp".to_string()));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = FinderConfig::from_json(
            r#"{"locations": ["Leeds UK"], "fetch_backend": "webdriver", "result_delay_ms": 0}"#,
        )
        .unwrap();
        assert_eq!(config.locations, vec!["Leeds UK"]);
        assert_eq!(config.fetch_backend, FetchBackend::Webdriver);
        assert_eq!(config.result_delay_ms, 0);
        assert_eq!(config.link_delay_ms, 1000);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = FinderConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unreadable_config_file_is_config_error() {
        // A directory opens on Linux but cannot be read as text
        let dir = std::env::temp_dir();
        match FinderConfig::from_file(&dir) {
            Err(Error::Config(message)) => {
                assert!(message.contains(&dir.display().to_string()), "{}", message)
            }
            other => panic!("expected config error, got {:?}", other),
        }

        let missing = dir.join("foodbank-finder-missing-config.json");
        assert!(matches!(
            FinderConfig::from_file(&missing),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_queries_for() {
        let config = FinderConfig {
            query_templates: vec![
                "{term} {location} -Trussell".to_string(),
                "community {term} {location}".to_string(),
            ],
            ..FinderConfig::default()
        };
        assert_eq!(
            config.queries_for("Leeds UK", "food bank"),
            vec![
                "food bank Leeds UK -Trussell",
                "community food bank Leeds UK"
            ]
        );
    }

    #[test]
    fn test_credentials_require_both_keys() {
        let creds = Credentials::from_lookup(|name| match name {
            "SERPER_API_KEY" => Some("s".to_string()),
            "OPENAI_API_KEY" => Some("o".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.search_api_key, "s");
        assert_eq!(creds.model_api_key, "o");

        let err = Credentials::from_lookup(|name| match name {
            "SERPER_API_KEY" => Some("s".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = Credentials::from_lookup(|_| Some("   ".to_string())).unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }
}
