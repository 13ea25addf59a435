//! Discovers UK food banks from web search results.
//!
//! A run searches for every configured (location, term) pair, fetches each hit, classifies
//! it as a single food bank, a directory of food banks or something else, extracts a
//! structured record from single pages and follows directory pages one level deep. The
//! collected entries are deduplicated by address or domain.

pub mod classifier;
pub mod config;
pub mod dedup;
pub mod error;
pub mod expander;
pub mod extractor;
pub mod fetchers;
pub mod filter;
pub mod llm;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod search;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{Credentials, FetchBackend, FinderConfig};
pub use error::{Error, Result};
pub use fetchers::PageFetcher;
pub use llm::{LanguageModel, OpenAiClient};
pub use pipeline::{Pipeline, RunSummary};
pub use results::{ErrorRecord, FoodbankRecord, PageClassification, ResultEntry, Structured};
pub use search::{SearchProvider, SerperClient};
