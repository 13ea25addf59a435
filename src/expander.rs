//! Turns a directory page into candidate food bank URLs.
//!
//! Five strategies run in order and the first one that yields anything wins. Whatever comes
//! out is deduplicated and passed through a loose keyword filter; the classification of the
//! fetched candidate is the real gate.

use crate::error::Error;
use crate::filter::{KeywordSet, LinkFilter, LinkFilterConfig, normalize_url, resolve_link};
use crate::llm::{CompletionRequest, LanguageModel};
use crate::parsers::{html, json};
use crate::utils::{slugify, truncate_chars};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

const LINK_KEYWORDS: &[&str] = &[
    "foodbank",
    "food bank",
    "pantry",
    "food pantry",
    "food-bank",
    "foodbank.org",
    "foodbank.org.uk",
    "trussell",
    "turn2us",
    "charity",
    "community",
    "support",
    "help",
    "assistance",
    "central",
    "south",
    "north",
    "east",
    "west",
];

const CONTAINER_CLASS_KEYWORDS: &[&str] = &["food", "bank", "pantry", "charity", "support", "help"];

const NETWORK_DOMAINS: &[&str] = &[
    "foodbank.org.uk",
    "foodbank.org",
    "trusselltrust.org",
    "turn2us.org.uk",
    "charitycommission.gov.uk",
];

const ORGANIZATION_KEYWORDS: &[&str] = &["food", "bank", "pantry", "charity"];

const FILTER_KEYWORDS: &[&str] = &[
    "foodbank",
    "food-bank",
    "pantry",
    "food",
    "charity",
    "org",
    "uk",
];

const URL_PROMPT_CHARS: usize = 4000;
const URL_PROMPT_MAX_TOKENS: u32 = 400;
const NAME_PROMPT_CHARS: usize = 3000;
const NAME_PROMPT_MAX_TOKENS: u32 = 300;

const URL_PROMPT: &str = "Extract food bank website URLs from this directory page text. \
Look for any mentions of food banks, pantries, charities, or food assistance services. \
Also look for organization names that might be food banks. \
Return ONLY a JSON array of URLs, nothing else. If no URLs found, return [].";

const NAME_PROMPT: &str = "Extract food bank organization names from this text. \
Look for any food banks, pantries, or food assistance organizations mentioned. \
Return ONLY a JSON array of organization names, nothing else.";

static URL_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>\[\]]+"#).expect("valid url regex"));

static CANDIDATE_FILTER: LazyLock<LinkFilter> = LazyLock::new(|| {
    LinkFilter::new(LinkFilterConfig {
        required_keywords: FILTER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        ..LinkFilterConfig::default()
    })
    .expect("valid default exclude patterns")
});

/// The strategy that produced a directory's candidate links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    AnchorKeywords,
    ContainerClasses,
    NetworkDomains,
    ModelUrls,
    ModelOrganizations,
}

impl Strategy {
    /// Strategies in the order they are tried
    pub const CASCADE: [Strategy; 5] = [
        Strategy::AnchorKeywords,
        Strategy::ContainerClasses,
        Strategy::NetworkDomains,
        Strategy::ModelUrls,
        Strategy::ModelOrganizations,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::AnchorKeywords => "anchor keywords",
            Strategy::ContainerClasses => "container classes",
            Strategy::NetworkDomains => "network domains",
            Strategy::ModelUrls => "model URL extraction",
            Strategy::ModelOrganizations => "model organization names",
        };
        f.write_str(label)
    }
}

/// Candidate links found on a directory page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Deduplicated, filtered links in discovery order
    pub links: Vec<String>,
    /// Strategy that produced the raw links, `None` when all came up empty
    pub strategy: Option<Strategy>,
}

/// Extracts candidate food bank URLs from directory pages
pub struct DirectoryExpander<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> DirectoryExpander<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Expand a directory page.
    ///
    /// `locality` holds place words for the area being searched; they widen the anchor
    /// keywords, the domain allowlist and the final filter.
    pub async fn expand(
        &self,
        html_content: &str,
        base_url: &str,
        locality: &[String],
    ) -> Expansion {
        let base = Url::parse(base_url).ok();

        let mut found = Vec::new();
        let mut strategy = None;
        for candidate in Strategy::CASCADE {
            found = match candidate {
                Strategy::AnchorKeywords => {
                    anchor_keyword_links(html_content, base.as_ref(), locality)
                }
                Strategy::ContainerClasses => container_links(html_content, base.as_ref()),
                Strategy::NetworkDomains => network_domain_links(html_content, locality),
                Strategy::ModelUrls => self.model_urls(html_content).await,
                Strategy::ModelOrganizations => self.model_organizations(html_content).await,
            };
            if !found.is_empty() {
                strategy = Some(candidate);
                break;
            }
        }

        match strategy {
            Some(s) => ::log::debug!("{} raw links from {} via {}", found.len(), base_url, s),
            None => ::log::warn!(
                "{}",
                Error::DirectoryExpansionExhausted {
                    url: base_url.to_string()
                }
            ),
        }

        let self_link = base.as_ref().map(|b| normalize_url(b).to_string());
        let unique = dedupe(found, self_link.as_deref());
        let links = final_filter(locality).apply(unique);

        Expansion { links, strategy }
    }

    /// Strategy 4: ask the model for URLs and pull every URL-shaped substring from its answer
    async fn model_urls(&self, html_content: &str) -> Vec<String> {
        let prompt = format!(
            "{}\n\nTEXT:\n{}",
            URL_PROMPT,
            truncate_chars(html_content, URL_PROMPT_CHARS)
        );
        match self
            .model
            .complete(CompletionRequest::new(prompt, URL_PROMPT_MAX_TOKENS))
            .await
        {
            Ok(answer) => urls_in_text(&answer),
            Err(e) => {
                ::log::warn!("Model link extraction failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Strategy 5: ask the model for organization names and guess their `.org.uk` sites.
    ///
    /// The guessed URLs are unverified.
    async fn model_organizations(&self, html_content: &str) -> Vec<String> {
        let prompt = format!(
            "{}\n\nTEXT:\n{}",
            NAME_PROMPT,
            truncate_chars(html_content, NAME_PROMPT_CHARS)
        );
        let answer = match self
            .model
            .complete(CompletionRequest::new(prompt, NAME_PROMPT_MAX_TOKENS))
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                ::log::warn!("Organization name extraction failed: {}", e);
                return Vec::new();
            }
        };

        let keywords = KeywordSet::new(ORGANIZATION_KEYWORDS);
        json::quoted_strings(&answer)
            .iter()
            .filter(|name| keywords.matches(name))
            .flat_map(|name| guess_org_urls(name))
            .collect()
    }
}

/// Strategy 1: anchors whose href or text mentions a food bank term
fn anchor_keyword_links(
    html_content: &str,
    base: Option<&Url>,
    locality: &[String],
) -> Vec<String> {
    let keywords = KeywordSet::new(LINK_KEYWORDS).with_extra(locality);
    html::anchors(html_content)
        .into_iter()
        .filter(|a| keywords.matches(&a.href) || keywords.matches(&a.text))
        .filter_map(|a| resolve_link(base, &a.href))
        .collect()
}

/// Strategy 2: anchors inside containers whose class mentions food, charity or support
fn container_links(html_content: &str, base: Option<&Url>) -> Vec<String> {
    let class_keywords = KeywordSet::new(CONTAINER_CLASS_KEYWORDS);
    html::container_anchors(html_content, &class_keywords)
        .into_iter()
        .filter_map(|a| resolve_link(base, &a.href))
        .collect()
}

/// Strategy 3: absolute links into known food bank network domains
fn network_domain_links(html_content: &str, locality: &[String]) -> Vec<String> {
    let domains = KeywordSet::new(NETWORK_DOMAINS).with_extra(locality);
    html::anchors(html_content)
        .into_iter()
        .filter(|a| a.href.starts_with("http") && domains.matches(&a.href))
        .filter_map(|a| resolve_link(None, &a.href))
        .collect()
}

/// Every URL-shaped substring of free text, trailing punctuation removed
pub fn urls_in_text(text: &str) -> Vec<String> {
    URL_IN_TEXT_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ')', '`']))
        .filter(|u| Url::parse(u).is_ok())
        .map(str::to_string)
        .collect()
}

/// Candidate sites for an organization name: joined, hyphenated and www-prefixed `.org.uk`
pub fn guess_org_urls(name: &str) -> Vec<String> {
    let joined = slugify(name, "");
    let hyphenated = slugify(name, "-");
    if joined.is_empty() {
        return Vec::new();
    }
    vec![
        format!("https://{}.org.uk", joined),
        format!("https://{}.org.uk", hyphenated),
        format!("https://www.{}.org.uk", joined),
    ]
}

/// Removes duplicates (fragment-insensitive) and the directory's own URL, keeping first-seen order
fn dedupe(links: Vec<String>, self_link: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| {
            let key = Url::parse(link)
                .map(|u| normalize_url(&u).to_string())
                .unwrap_or_else(|_| link.clone());
            Some(key.as_str()) != self_link && seen.insert(key)
        })
        .collect()
}

fn final_filter(locality: &[String]) -> LinkFilter {
    CANDIDATE_FILTER.with_extra_keywords(locality)
}
