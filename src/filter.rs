use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Case-insensitive substring matcher over a fixed keyword list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Create a keyword set; keywords are lower-cased once here
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Returns a copy extended with extra keywords
    pub fn with_extra<S: AsRef<str>>(&self, extra: &[S]) -> Self {
        let mut keywords = self.keywords.clone();
        for k in extra {
            let k = k.as_ref().trim().to_lowercase();
            if !k.is_empty() && !keywords.contains(&k) {
                keywords.push(k);
            }
        }
        Self { keywords }
    }

    /// True when any keyword occurs in `haystack`
    pub fn matches(&self, haystack: &str) -> bool {
        let haystack = haystack.to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    /// First keyword occurring in `haystack`
    pub fn first_match(&self, haystack: &str) -> Option<&str> {
        let haystack = haystack.to_lowercase();
        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

/// Configuration for candidate-link filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// At least one of these must occur in the link
    #[serde(default)]
    pub required_keywords: Vec<String>,

    /// Regex patterns for links to drop (asset files and the like)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![r"(?i)\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf)$".to_string()]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            required_keywords: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Decides which candidate links survive directory expansion
#[derive(Debug, Clone)]
pub struct LinkFilter {
    required: KeywordSet,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            required: KeywordSet::new(&config.required_keywords),
            exclude_regexes,
        })
    }

    /// Determine if a link should be kept as a food bank candidate
    pub fn should_keep(&self, link: &str) -> bool {
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        // Exclusions take precedence
        if self.exclude_regexes.iter().any(|re| re.is_match(url.path())) {
            return false;
        }

        self.required.is_empty() || self.required.matches(link)
    }

    /// Returns a copy that also accepts links containing one of `extra`
    pub fn with_extra_keywords<S: AsRef<str>>(&self, extra: &[S]) -> Self {
        Self {
            required: self.required.with_extra(extra),
            exclude_regexes: self.exclude_regexes.clone(),
        }
    }

    /// Keeps the links that pass, preserving order
    pub fn apply(&self, links: Vec<String>) -> Vec<String> {
        links.into_iter().filter(|l| self.should_keep(l)).collect()
    }
}

/// Resolves `href` against `base` and strips the fragment. Only http(s) results are returned.
pub fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(href).ok()?,
        Err(_) => return None,
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    Some(normalize_url(&resolved).to_string())
}

/// Create a normalized version of the URL (fragment removed)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}
