//! Shared HTTP plumbing for provider requests.
//!
//! Provides a configured [`reqwest::Client`] builder with browser-like
//! User-Agent rotation, and [`fetch_text`], which races a whole request
//! (send, status check, body read) against the caller's cancellation token.

use std::future::Future;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] for provider requests.
///
/// The client has:
/// - The given per-request timeout
/// - The given User-Agent, or a random one from the built-in rotation list
/// - Brotli and gzip decompression
/// - At most 10 redirects
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the timeout is zero or the client
/// cannot be constructed.
pub fn build_client(
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, SearchError> {
    if timeout.is_zero() {
        return Err(SearchError::Config("timeout must be greater than 0".into()));
    }

    let ua = user_agent.unwrap_or_else(|| random_user_agent());

    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Run `fut` unless `cancel` fires first.
///
/// # Errors
///
/// Returns [`SearchError::Cancelled`] if the token fires before `fut`
/// completes; otherwise whatever `fut` returns.
pub async fn with_cancel<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SearchError::Cancelled),
        result = fut => result,
    }
}

/// Send `request` and read the body as text, aborting on cancellation.
///
/// # Errors
///
/// - [`SearchError::Http`] on connection failure, timeout or body read failure
/// - [`SearchError::Status`] on a non-success HTTP status
/// - [`SearchError::Cancelled`] if `cancel` fires first
pub async fn fetch_text(
    cancel: &CancellationToken,
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<String, SearchError> {
    with_cancel(cancel, async {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Http(format!("{provider} request timed out: {e}"))
            } else {
                SearchError::Http(format!("{provider} request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                provider: provider.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("{provider} response read failed: {e}")))
    })
    .await
}
