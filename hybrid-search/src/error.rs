//! Error types for the hybrid-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or other credentials appear in
//! error messages.

/// Errors that can occur while querying a search provider.
///
/// The aggregator never surfaces these to its caller: a provider that
/// fails simply contributes no results to the merged response.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request could not be sent or the response body could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status code.
    #[error("{provider} returned HTTP {status}")]
    Status {
        /// Provider name.
        provider: String,
        /// HTTP status code.
        status: u16,
    },

    /// Failed to decode the provider's JSON or HTML payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider is not configured or has exhausted its quota.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The caller's cancellation token fired before the search finished.
    #[error("search cancelled")]
    Cancelled,

    /// Invalid provider configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for hybrid-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
