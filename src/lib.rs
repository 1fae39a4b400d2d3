//! # hybrid
//!
//! Host for the [`hybrid_search`] aggregation core: configuration,
//! provider bootstrap, request validation and deadline-bound search.
//!
//! ```no_run
//! # async fn example() -> hybrid::error::Result<()> {
//! let config = hybrid::HybridConfig::load(None)?;
//! let aggregator = hybrid::startup::build_aggregator(&config)?;
//! let response = hybrid::runner::handle_search(&aggregator, &config, "rust async", None, &[]).await?;
//! println!("{} results from {:?}", response.count, response.sources_used);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod request;
pub mod runner;
pub mod startup;

pub use config::HybridConfig;
pub use error::{HybridError, Result};
