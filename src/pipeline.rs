//! Drives a discovery run: search, fetch, classify, then extract or expand.
//!
//! Everything runs sequentially. Each visited URL appends exactly one entry to the run's
//! result list, except directory links whose fetch fails, which are skipped.

use crate::classifier::{ClassificationSource, PageClassifier};
use crate::config::FinderConfig;
use crate::dedup::deduplicate;
use crate::expander::DirectoryExpander;
use crate::extractor::RecordExtractor;
use crate::fetchers::PageFetcher;
use crate::filter::KeywordSet;
use crate::llm::LanguageModel;
use crate::results::{ErrorRecord, PageClassification, ResultEntry, SearchResult, Structured};
use crate::search::SearchProvider;
use crate::utils::{domain_from_url, locality_terms, truncate_chars};
use std::time::Duration;

/// Counts describing a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub records: usize,
    pub errors: usize,
    pub unique: usize,
}

impl RunSummary {
    /// `entries` collected, `errors` of them error records, `unique` left after deduplication
    pub fn new(entries: usize, errors: usize, unique: usize) -> Self {
        Self {
            entries,
            records: entries.saturating_sub(errors),
            errors,
            unique,
        }
    }
}

/// The orchestrator. Borrows its collaborators; owns nothing but its settings.
pub struct Pipeline<'a> {
    config: &'a FinderConfig,
    search: &'a dyn SearchProvider,
    fetcher: &'a dyn PageFetcher,
    classifier: PageClassifier<'a>,
    extractor: RecordExtractor<'a>,
    expander: DirectoryExpander<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a FinderConfig,
        search: &'a dyn SearchProvider,
        fetcher: &'a dyn PageFetcher,
        model: &'a dyn LanguageModel,
    ) -> Self {
        let indicators = KeywordSet::new(&config.directory_url_indicators);
        Self {
            config,
            search,
            fetcher,
            classifier: PageClassifier::new(model, indicators, config.classify_text_limit),
            extractor: RecordExtractor::new(model),
            expander: DirectoryExpander::new(model),
        }
    }

    /// Runs every (location, term) pair and returns the deduplicated entries with a summary
    pub async fn discover(&self) -> (Vec<ResultEntry>, RunSummary) {
        let entries = self.run().await;
        let total = entries.len();
        let errors = entries.iter().filter(|e| e.structured.is_error()).count();
        let unique = deduplicate(entries);
        let summary = RunSummary::new(total, errors, unique.len());

        ::log::info!(
            "Run complete: {} entries ({} records, {} errors), {} unique",
            summary.entries,
            summary.records,
            summary.errors,
            summary.unique
        );
        (unique, summary)
    }

    /// Runs every (location, term) pair and returns all entries in visit order
    pub async fn run(&self) -> Vec<ResultEntry> {
        let mut results = Vec::new();
        for location in &self.config.locations {
            for term in &self.config.terms {
                self.run_pair(location, term, &mut results).await;
            }
        }
        results
    }

    /// Processes one (location, term) pair, appending to `results`
    pub async fn run_pair(&self, location: &str, term: &str, results: &mut Vec<ResultEntry>) {
        let hits = self.collect_search_results(location, term).await;
        ::log::info!("Total: {} search results", hits.len());

        let locality = locality_terms(location);
        for hit in hits.into_iter().take(self.config.max_results) {
            let entry = self.process_hit(hit, location, &locality, results).await;
            results.push(entry);
            pause(self.config.result_delay_ms).await;
        }
    }

    /// Gathers result pages for every query of the pair. A failed or empty page ends that
    /// query's paging.
    async fn collect_search_results(&self, location: &str, term: &str) -> Vec<SearchResult> {
        let mut hits = Vec::new();
        for query in self.config.queries_for(location, term) {
            ::log::info!("Searching: {}", query);
            for page in 1..=self.config.max_search_pages {
                match self.search.search(&query, page).await {
                    Ok(page_hits) => {
                        ::log::info!("Page {}: {} results", page, page_hits.len());
                        let exhausted = page_hits.is_empty();
                        hits.extend(page_hits);
                        if exhausted {
                            break;
                        }
                    }
                    Err(e) => {
                        ::log::warn!("{}", e);
                        break;
                    }
                }
            }
        }
        hits
    }

    /// Handles one search hit. Expanded directory links are appended to `results` directly;
    /// the returned entry describes the hit itself.
    async fn process_hit(
        &self,
        hit: SearchResult,
        location: &str,
        locality: &[String],
        results: &mut Vec<ResultEntry>,
    ) -> ResultEntry {
        let url = hit.url;
        let domain = domain_from_url(&url);
        ::log::info!("Scraping {} ({})", url, hit.title);

        let structured: Structured = match self
            .fetcher
            .fetch_text(&url, self.config.page_text_limit)
            .await
        {
            Err(e) => {
                ::log::warn!("{}", e);
                ErrorRecord::new(e.to_string()).into()
            }
            Ok(main_text) => {
                let (classification, source) =
                    self.classifier.classify(&main_text, Some(&url)).await;
                match source {
                    ClassificationSource::UrlIndicator => {
                        ::log::info!("Classified as: {} (URL indicator)", classification)
                    }
                    _ => ::log::info!("Classified as: {}", classification),
                }

                match classification {
                    PageClassification::Single => {
                        self.extractor.extract(self.extract_input(&main_text)).await
                    }
                    PageClassification::Directory => {
                        let found = self
                            .expand_directory(&url, &main_text, location, locality, results)
                            .await;
                        ErrorRecord::new(format!(
                            "Directory page processed, extracted {} links",
                            found
                        ))
                        .into()
                    }
                    PageClassification::Other => ErrorRecord::new(format!(
                        "Skipped page classified as '{}'",
                        classification
                    ))
                    .into(),
                }
            }
        };

        ResultEntry::new(Some(hit.title), url, domain, location, structured)
    }

    /// Expands a directory page one level deep and returns how many links it yielded
    async fn expand_directory(
        &self,
        url: &str,
        main_text: &str,
        location: &str,
        locality: &[String],
        results: &mut Vec<ResultEntry>,
    ) -> usize {
        ::log::info!("Directory page: extracting links from {}", url);

        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                ::log::warn!("Falling back to page text for link extraction: {}", e);
                main_text.to_string()
            }
        };

        let expansion = self.expander.expand(&html, url, locality).await;
        ::log::info!("Found {} food bank links", expansion.links.len());

        for link in expansion.links.iter().take(self.config.max_directory_links) {
            ::log::info!("Processing: {}", link);
            match self
                .fetcher
                .fetch_text(link, self.config.page_text_limit)
                .await
            {
                Ok(text) if !text.is_empty() => {
                    let structured = self.extractor.extract(self.extract_input(&text)).await;
                    results.push(ResultEntry::new(
                        Some(link.clone()),
                        link.clone(),
                        domain_from_url(link),
                        location,
                        structured,
                    ));
                }
                Ok(_) => ::log::debug!("Skipping {}: no text", link),
                Err(e) => ::log::warn!("Skipping {}", e),
            }
            pause(self.config.link_delay_ms).await;
        }

        expansion.links.len()
    }

    fn extract_input<'t>(&self, text: &'t str) -> &'t str {
        truncate_chars(text, self.config.extract_text_limit)
    }
}

async fn pause(millis: u64) {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
