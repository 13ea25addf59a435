//! End-to-end runs of the discovery pipeline against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use foodbank_finder::fetchers::FetchedPage;
use foodbank_finder::llm::CompletionRequest;
use foodbank_finder::parsers::ParserType;
use foodbank_finder::results::SearchResult;
use foodbank_finder::{
    Error, FinderConfig, LanguageModel, PageFetcher, Pipeline, Result, SearchProvider, Structured,
};

const QUERY: &str = "foodbank Manchester UK";

/// Serves canned result pages keyed by page number; unknown pages are empty
struct FakeSearch {
    pages: HashMap<u32, Result<Vec<SearchResult>>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeSearch {
    fn new(pages: Vec<(u32, Result<Vec<SearchResult>>)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, page: u32) -> Result<Vec<SearchResult>> {
        self.calls.lock().unwrap().push((query.to_string(), page));
        match self.pages.get(&page) {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(_)) => Err(Error::Search {
                query: query.to_string(),
                page,
                reason: "HTTP 429".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Serves HTML by exact URL; anything else fails like a dead host
struct FakeFetcher {
    pages: HashMap<String, String>,
}

impl FakeFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                body: body.clone(),
                parser_type: ParserType::Html,
            }),
            None => Err(Error::Fetch {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Answers classification and extraction prompts by looking for marker text in the prompt
struct FakeModel {
    labels: Vec<(&'static str, &'static str)>,
    records: Vec<(&'static str, &'static str)>,
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let prompt = request.prompt;
        let (rules, default) = if prompt.contains("CONTENT:\n") {
            (&self.labels, "other")
        } else if prompt.contains("extracts structured data") {
            (&self.records, "no idea")
        } else {
            return Ok("[]".to_string());
        };

        Ok(rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker))
            .map(|(_, answer)| *answer)
            .unwrap_or(default)
            .to_string())
    }
}

fn hit(title: &str, url: &str) -> SearchResult {
    SearchResult::new(title, url)
}

fn test_config() -> FinderConfig {
    FinderConfig {
        locations: vec!["Manchester UK".to_string()],
        terms: vec!["foodbank".to_string()],
        query_templates: vec!["{term} {location}".to_string()],
        result_delay_ms: 0,
        link_delay_ms: 0,
        ..FinderConfig::default()
    }
}

const HULME_URL: &str = "https://hulmepantry.org.uk/";
const HULME_CONTACT_URL: &str = "https://hulmepantry.org.uk/contact";
const DIRECTORY_URL: &str = "https://www.yelp.co.uk/search?find_desc=foodbank";
const SALFORD_URL: &str = "https://salford.foodbank.org.uk/";
const BROKEN_URL: &str = "https://broken.foodbank.org.uk/";
const DEAD_URL: &str = "https://nowhere.example/";
const COUNCIL_URL: &str = "https://www.manchester.gov.uk/news";

const HULME_PAGE: &str =
    "<html><body><main><h1>Welcome to Hulme Pantry</h1><p>12 Mill Street</p></main></body></html>";
const HULME_CONTACT_PAGE: &str =
    "<html><body><p>Contact the pantry team at our Mill Street hall.</p></body></html>";
const DIRECTORY_PAGE: &str = r#"<html><body>
<h1>Top 10 Food Banks near Manchester</h1>
<ul>
  <li><a href="https://salford.foodbank.org.uk/">Salford Foodbank</a></li>
  <li><a href="https://broken.foodbank.org.uk/">Broken Foodbank</a></li>
  <li><a href="/about">About Yelp</a></li>
</ul>
</body></html>"#;
const SALFORD_PAGE: &str =
    "<html><body><main>Salford Foodbank, 1 Chapel Street, Salford</main></body></html>";
const COUNCIL_PAGE: &str = "<html><body><main>Council news and events</main></body></html>";

fn scenario_fetcher() -> FakeFetcher {
    FakeFetcher::new(&[
        (HULME_URL, HULME_PAGE),
        (HULME_CONTACT_URL, HULME_CONTACT_PAGE),
        (DIRECTORY_URL, DIRECTORY_PAGE),
        (SALFORD_URL, SALFORD_PAGE),
        (COUNCIL_URL, COUNCIL_PAGE),
    ])
}

fn scenario_model() -> FakeModel {
    FakeModel {
        labels: vec![("Welcome to Hulme", "single"), ("pantry team", "single")],
        records: vec![
            (
                "Welcome to Hulme",
                r#"{"Name": "Hulme Pantry", "Address": "12 Mill Street, Manchester", "OpeningHours": {"Tue": "10-12"}}"#,
            ),
            (
                "pantry team",
                r#"Sure! {"Name": "Hulme Pantry (contact)", "Address": " 12 mill street, MANCHESTER "}"#,
            ),
            (
                "Salford Foodbank",
                r#"{"Name": "Salford Foodbank", "Address": "1 Chapel Street, Salford"}"#,
            ),
        ],
    }
}

fn scenario_search() -> FakeSearch {
    FakeSearch::new(vec![
        (
            1,
            Ok(vec![
                hit("Hulme Pantry", HULME_URL),
                hit("Contact Hulme Pantry", HULME_CONTACT_URL),
                hit("Top 10 Food Banks near Manchester", DIRECTORY_URL),
                hit("Nowhere", DEAD_URL),
                hit("Council news", COUNCIL_URL),
            ]),
        ),
        (
            2,
            Err(Error::Search {
                query: QUERY.to_string(),
                page: 2,
                reason: "rate limited".to_string(),
            }),
        ),
    ])
}

#[tokio::test]
async fn run_appends_one_entry_per_visited_url() {
    let config = test_config();
    let search = scenario_search();
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let pipeline = Pipeline::new(&config, &search, &fetcher, &model);
    let entries = pipeline.run().await;

    let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            HULME_URL,
            HULME_CONTACT_URL,
            SALFORD_URL,
            DIRECTORY_URL,
            DEAD_URL,
            COUNCIL_URL
        ]
    );
    assert!(entries.iter().all(|e| e.location == "Manchester UK"));
    // Expanded links that fail to fetch leave no entry
    assert!(!entries.iter().any(|e| e.url == BROKEN_URL));

    let hulme = entries[0].structured.record().unwrap();
    assert_eq!(hulme.name.as_deref(), Some("Hulme Pantry"));
    assert_eq!(hulme.opening_hours.as_deref(), Some("Tue: 10-12"));
    assert_eq!(entries[0].name.as_deref(), Some("Hulme Pantry"));
    assert_eq!(entries[0].domain, "hulmepantry.org.uk");

    // Expanded links are named after themselves
    assert_eq!(entries[2].name.as_deref(), Some(SALFORD_URL));
    assert_eq!(entries[2].domain, "foodbank.org.uk");
    assert_eq!(
        entries[2].structured.record().unwrap().name.as_deref(),
        Some("Salford Foodbank")
    );

    match &entries[3].structured {
        Structured::Error(e) => {
            assert_eq!(e.error, "Directory page processed, extracted 2 links")
        }
        other => panic!("expected directory marker, got {other:?}"),
    }
    match &entries[4].structured {
        Structured::Error(e) => assert!(e.error.starts_with("Error fetching page"), "{}", e.error),
        other => panic!("expected fetch error, got {other:?}"),
    }
    match &entries[5].structured {
        Structured::Error(e) => assert_eq!(e.error, "Skipped page classified as 'other'"),
        other => panic!("expected skip marker, got {other:?}"),
    }
}

#[tokio::test]
async fn search_error_stops_paging_for_the_query() {
    let config = test_config();
    let search = scenario_search();
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    Pipeline::new(&config, &search, &fetcher, &model)
        .run()
        .await;

    assert_eq!(
        search.calls(),
        vec![(QUERY.to_string(), 1), (QUERY.to_string(), 2)]
    );
}

#[tokio::test]
async fn discover_deduplicates_by_address_then_domain() {
    let config = test_config();
    let search = scenario_search();
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let pipeline = Pipeline::new(&config, &search, &fetcher, &model);
    let (unique, summary) = pipeline.discover().await;

    assert_eq!(summary.entries, 6);
    assert_eq!(summary.records, 3);
    assert_eq!(summary.errors, 3);
    assert_eq!(summary.unique, 5);

    let hulme: Vec<_> = unique
        .iter()
        .filter(|e| {
            e.structured
                .record()
                .and_then(|r| r.address.as_deref())
                .is_some_and(|a| a.trim().eq_ignore_ascii_case("12 mill street, manchester"))
        })
        .collect();
    assert_eq!(hulme.len(), 1);
    assert_eq!(hulme[0].url, HULME_URL);
}

#[tokio::test]
async fn output_uses_record_field_names() {
    let config = test_config();
    let search = scenario_search();
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let (unique, _) = Pipeline::new(&config, &search, &fetcher, &model)
        .discover()
        .await;
    let value: Value = serde_json::to_value(&unique).unwrap();

    let first = &value[0];
    assert_eq!(first["url"], HULME_URL);
    assert_eq!(first["structured"]["Name"], "Hulme Pantry");
    assert_eq!(first["structured"]["Address"], "12 Mill Street, Manchester");
    assert!(first["structured"]["Email"].is_null());

    let skipped = value
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["url"] == COUNCIL_URL)
        .unwrap();
    assert_eq!(skipped["structured"]["error"], "Skipped page classified as 'other'");
}

#[tokio::test]
async fn max_results_caps_processed_hits() {
    let config = FinderConfig {
        max_results: 1,
        ..test_config()
    };
    let search = scenario_search();
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let entries = Pipeline::new(&config, &search, &fetcher, &model)
        .run()
        .await;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].url, HULME_URL);
}

#[tokio::test]
async fn empty_page_ends_paging_and_every_query_runs() {
    let config = FinderConfig {
        query_templates: vec![
            "{term} {location}".to_string(),
            "community {term} {location}".to_string(),
        ],
        ..test_config()
    };
    let search = FakeSearch::new(vec![(1, Ok(vec![hit("Council news", COUNCIL_URL)]))]);
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let entries = Pipeline::new(&config, &search, &fetcher, &model)
        .run()
        .await;

    assert_eq!(
        search.calls(),
        vec![
            (QUERY.to_string(), 1),
            (QUERY.to_string(), 2),
            ("community foodbank Manchester UK".to_string(), 1),
            ("community foodbank Manchester UK".to_string(), 2),
        ]
    );
    // One hit per query
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn single_result_yields_one_entry_keyed_by_address() {
    let config = test_config();
    let search = FakeSearch::new(vec![(1, Ok(vec![hit("Hulme Pantry", HULME_URL)]))]);
    let fetcher = scenario_fetcher();
    let model = scenario_model();

    let (unique, summary) = Pipeline::new(&config, &search, &fetcher, &model)
        .discover()
        .await;

    assert_eq!(summary.unique, 1);
    assert_eq!(unique.len(), 1);
    assert_eq!(
        foodbank_finder::dedup::dedup_key(&unique[0]),
        "12 mill street, manchester"
    );
}
