// src/main.rs
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod dedupe;
mod error;
mod export;
mod fetch;
mod models;
mod normalizer;
mod pipeline;
mod report;
mod sources;

use cli::Cli;
use config::{load_config, load_proxies, ApiKeys, Config};
use error::{Error, Result};
use fetch::Fetcher;
use pipeline::{LeadQuery, Pipeline};
use sources::{build_adapter, SourceAdapter};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadgen=info")),
        )
        .init();

    if let Err(e) = run(args).await {
        eprintln!("error: {}", e);
        // Only bad configuration or a total export failure are fatal
        let code = match e {
            Error::Config(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(args: Cli) -> Result<()> {
    args.validate()?;
    let source_ids = args.resolve_sources()?;

    let config = match load_config("config.yml").await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config.yml: {}. Using defaults.", e);
            Config::default()
        }
    };

    let delay = match args.delay {
        Some(seconds) => Duration::from_secs_f64(seconds),
        None => Duration::from_millis(config.scraping.rate_limit_delay_ms),
    };

    // Proxy pool and API keys are read once here and injected; adapters
    // never touch the environment themselves.
    let mut proxies = load_proxies().await;
    if let Some(proxy) = &args.proxy {
        proxies.insert(0, proxy.clone());
    }
    if !proxies.is_empty() {
        info!("Loaded {} proxies for rotation", proxies.len());
    }
    let keys = ApiKeys::from_env();

    let fetcher = Arc::new(Fetcher::new(
        &proxies,
        config.scraping.request_timeout_seconds,
        delay,
    )?);

    let adapters: Vec<Arc<dyn SourceAdapter>> = source_ids
        .iter()
        .filter_map(|id| build_adapter(id, fetcher.clone(), &keys))
        .collect();

    info!(
        "Starting lead generation for {} in {} ({} sources, {})",
        args.industry,
        args.location,
        adapters.len(),
        if args.parallel { "parallel" } else { "sequential" }
    );

    let query = LeadQuery {
        industry: args.industry.clone(),
        location: args.location.clone(),
        kind: args.kind,
        target_count: args.count,
    };

    let pipeline = Pipeline::new(&config.scraping, args.parallel, delay);
    let (collection, summary) = pipeline.collect(&query, &adapters).await;

    report::print_summary(&summary);

    let written = export::export(
        &collection,
        &summary,
        args.export_format,
        &args.output,
        config.output.pretty_json,
    )
    .await?;

    for path in &written {
        println!("📄 Wrote {}", path.display());
    }

    Ok(())
}
