//! Error types for the hybrid search host.

use hybrid_search::SearchError;

/// Top-level error type for configuration, bootstrap and request handling.
#[derive(Debug, thiserror::Error)]
pub enum HybridError {
    /// Configuration could not be read, parsed or validated.
    #[error("config error: {0}")]
    Config(String),

    /// A provider could not be constructed.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The query was rejected before reaching any provider.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HybridError>;
