//! Command-line front end for hybrid search.
//!
//! Prints the aggregated response (or provider status) as pretty JSON on
//! stdout. All tracing output goes to stderr so stdout stays clean JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hybrid::runner::handle_search;
use hybrid::startup::build_aggregator;
use hybrid::HybridConfig;
use tracing_subscriber::EnvFilter;

/// Search Brave, DuckDuckGo and Wikipedia at once and merge the results.
#[derive(Parser)]
#[command(name = "hybrid-search", version, about)]
struct Cli {
    /// Search query. Multiple words are joined with spaces.
    #[arg(required_unless_present = "status")]
    query: Vec<String>,

    /// Maximum number of results (clamped to 1..=50).
    #[arg(short = 'n', long = "max-results", allow_negative_numbers = true)]
    max_results: Option<i64>,

    /// Restrict the search to these providers (repeatable).
    #[arg(short, long = "source")]
    sources: Vec<String>,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the search deadline, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print provider status instead of searching.
    #[arg(long)]
    status: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hybrid=info,hybrid_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HybridConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout_secs = secs;
        config.validate()?;
    }

    let aggregator = build_aggregator(&config).context("starting search providers")?;

    let json = if cli.status {
        serde_json::to_string_pretty(&aggregator.provider_status())?
    } else {
        let query = cli.query.join(" ");
        let sources: Vec<&str> = cli.sources.iter().map(String::as_str).collect();
        let response = handle_search(&aggregator, &config, &query, cli.max_results, &sources).await?;
        tracing::info!(
            count = response.count,
            sources = ?response.sources_used,
            "search complete"
        );
        serde_json::to_string_pretty(&response)?
    };

    println!("{json}");
    Ok(())
}
