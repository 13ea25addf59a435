use clap::Parser;
use foodbank_finder::{FetchBackend, FinderConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "foodbank-finder")]
#[command(about = "Finds UK food banks through web search and page extraction")]
#[command(version)]
pub struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Location to search (repeatable); replaces the configured locations
    #[arg(short, long)]
    pub location: Vec<String>,

    /// Search term (repeatable); replaces the configured terms
    #[arg(short, long)]
    pub term: Vec<String>,

    /// Write the JSON results here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Search results processed per (location, term) pair
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Page fetching backend
    #[arg(long, value_enum)]
    pub backend: Option<FetchBackend>,
}

impl Args {
    /// Overlay the command-line overrides onto `config`
    pub fn apply_to(&self, config: &mut FinderConfig) {
        if !self.location.is_empty() {
            config.locations = self.location.clone();
        }
        if !self.term.is_empty() {
            config.terms = self.term.clone();
        }
        if let Some(max_results) = self.max_results {
            config.max_results = max_results;
        }
        if let Some(backend) = self.backend {
            config.fetch_backend = backend;
        }
    }
}
