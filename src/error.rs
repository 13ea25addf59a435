use thiserror::Error;

/// Errors raised at the collaborator boundaries of a discovery run.
///
/// Everything except [`Error::Config`] is recovered by the pipeline and turned into an
/// error record or a degraded record; nothing else stops a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential or unreadable configuration. Aborts the run before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure, timeout or non-success status while fetching a page
    #[error("Error fetching page {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Search API failure. Treated as "no more results" for the query.
    #[error("search failed for '{query}' (page {page}): {reason}")]
    Search {
        query: String,
        page: u32,
        reason: String,
    },

    /// Language model transport or response-shape failure
    #[error("language model call failed: {0}")]
    Model(String),

    /// Page classification could not be obtained; callers fall back to `other`
    #[error("classification failed: {0}")]
    Classification(String),

    /// The model output held no usable JSON object
    #[error("{reason}")]
    ExtractionParse { reason: String, raw: String },

    /// None of the link expansion strategies produced a candidate
    #[error("no food bank links found on directory page {url}")]
    DirectoryExpansionExhausted { url: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
