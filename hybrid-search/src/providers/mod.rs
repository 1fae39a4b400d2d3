//! Concrete search provider implementations.
//!
//! Each provider targets one backend with its own gating model:
//!
//! - [`BraveProvider`]: paid JSON API behind a daily quota
//! - [`DuckDuckGoProvider`]: HTML scraping behind a minimum call interval
//! - [`WikipediaProvider`]: keyless JSON API, always available

pub mod brave;
pub mod duckduckgo;
pub mod wikipedia;

pub use brave::{BraveConfig, BraveProvider};
pub use duckduckgo::{DuckDuckGoConfig, DuckDuckGoProvider};
pub use wikipedia::{WikipediaConfig, WikipediaProvider};
