use clap::Parser;
use foodbank_finder::results::ResultEntry;
use foodbank_finder::{Credentials, FinderConfig, OpenAiClient, Pipeline, SerperClient, fetchers};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match FinderConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => FinderConfig::default(),
    };
    config.apply_env();
    args.apply_to(&mut config);

    // Credentials are checked before anything touches the network
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            ::log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let fetcher = match fetchers::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            ::log::error!("Failed to start page fetcher: {}", e);
            std::process::exit(1);
        }
    };
    let search = SerperClient::with_base_url(&credentials.search_api_key, &config.search_endpoint);
    let model = OpenAiClient::with_base_url(
        &credentials.model_api_key,
        &config.model,
        &config.model_endpoint,
    );

    ::log::info!(
        "Searching {} location(s) for {} term(s) using {}",
        config.locations.len(),
        config.terms.len(),
        model.model()
    );

    let start_time = std::time::Instant::now();
    let pipeline = Pipeline::new(&config, &search, &*fetcher, &model);
    let (unique, summary) = pipeline.discover().await;
    fetcher.shutdown().await;

    ::log::info!(
        "Discovery complete - {} unique food banks from {} pages in {:.2} seconds",
        summary.unique,
        summary.entries,
        start_time.elapsed().as_secs_f64()
    );

    if let Err(e) = write_results(&unique, args.output.as_deref()) {
        ::log::error!("Failed to write results: {}", e);
        std::process::exit(1);
    }
}

fn write_results(
    entries: &[ResultEntry],
    output: Option<&std::path::Path>,
) -> foodbank_finder::Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            ::log::info!("Saved {} entries to {}", entries.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
