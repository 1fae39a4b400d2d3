//! Startup: construct the configured providers and register them.
//!
//! Call [`build_aggregator`] once at process start; the returned
//! [`Aggregator`] is shared by every search afterwards.

use hybrid_search::providers::{BraveProvider, DuckDuckGoProvider, WikipediaProvider};
use hybrid_search::Aggregator;
use tracing::{info, warn};

use crate::config::HybridConfig;
use crate::error::Result;

/// Build an aggregator holding every enabled provider.
///
/// Brave is registered only when it is enabled and an API key is
/// configured. A run with no provider at all is allowed; every search
/// then returns an empty result list.
///
/// # Errors
///
/// Returns an error if a provider's HTTP client cannot be built.
pub fn build_aggregator(config: &HybridConfig) -> Result<Aggregator> {
    let aggregator = Aggregator::new();

    if !config.brave.enabled {
        info!("Brave search disabled in config");
    } else if !config.brave.provider_config().has_api_key() {
        warn!("BRAVE_API_KEY not set, Brave search will be disabled");
    } else {
        aggregator.register_provider(BraveProvider::new(config.brave.provider_config())?);
        info!(daily_quota = config.brave.daily_quota, "Brave search enabled");
    }

    if config.duckduckgo.enabled {
        aggregator.register_provider(DuckDuckGoProvider::new(config.duckduckgo.provider_config())?);
        info!(
            min_interval_ms = config.duckduckgo.min_interval_ms,
            "DuckDuckGo search enabled"
        );
    }

    if config.wikipedia.enabled {
        aggregator.register_provider(WikipediaProvider::new(config.wikipedia.provider_config())?);
        info!("Wikipedia search enabled");
    }

    if aggregator.is_empty() {
        warn!("no search providers configured");
    }

    Ok(aggregator)
}
