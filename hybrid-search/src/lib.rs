//! # hybrid-search
//!
//! Search aggregation core: one query fanned out to several independent
//! search backends, merged into a single ranked, deduplicated list.
//!
//! ## Design
//!
//! - Providers implement [`SearchProvider`] and are held behind
//!   `Arc<dyn SearchProvider>` in a priority-ordered registry
//! - Brave (paid API, daily quota), DuckDuckGo (HTML scraping, minimum
//!   call interval) and Wikipedia (keyless JSON API) ship in [`providers`]
//! - [`Aggregator::search`] queries every eligible provider concurrently,
//!   waits for all of them, drops failures, dedups by URL and ranks by
//!   relevance
//! - A single [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   threads through every provider call, so a caller deadline aborts all
//!   in-flight requests at once
//!
//! ## Failure model
//!
//! Provider errors are logged and discarded. A search where every
//! provider fails still succeeds with an empty list.
//!
//! ## Security
//!
//! - API keys never appear in errors or logs
//! - Search queries are logged only at trace level
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> hybrid_search::Result<()> {
//! use hybrid_search::providers::{WikipediaConfig, WikipediaProvider};
//! use hybrid_search::Aggregator;
//! use tokio_util::sync::CancellationToken;
//!
//! let aggregator = Aggregator::new();
//! aggregator.register_provider(WikipediaProvider::new(WikipediaConfig::default())?);
//!
//! let cancel = CancellationToken::new();
//! let results = aggregator.search(&cancel, "rust programming", 5, &[]).await;
//! for result in &results {
//!     println!("{}: {}", result.title, result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod error;
pub mod http;
pub mod provider;
pub mod providers;
pub mod quota;
pub mod rate_limit;
pub mod types;

pub use aggregator::stats::ProviderStatus;
pub use aggregator::Aggregator;
pub use error::{Result, SearchError};
pub use provider::SearchProvider;
pub use quota::{DailyQuota, QuotaSnapshot};
pub use types::{AggregatedResponse, SearchResult};
