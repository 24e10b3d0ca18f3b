//! The shared outbound HTTP client: one `reqwest` client wrapped in
//! `reqwest-middleware`'s retry layer, reused by registry fetchers and the
//! vulnerability fetcher so every call gets the same timeout, user agent,
//! and exponential-backoff-on-5xx policy (spec.md §5).

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

/// Requests time out after this long, bounding how long a client disconnect
/// takes to unwind a suspended fetch (spec.md §5).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const MAX_RETRIES: u32 = 5;
const RETRY_BASE: Duration = Duration::from_millis(100);

/// Build the shared client used by every outbound registry, OSV, and
/// PyPI-stats call. Retries are transient-error-only (5xx and connect
/// failures); 4xx responses are returned to the caller unmodified.
#[must_use]
pub fn build_client(user_agent: &str) -> ClientWithMiddleware {
    let inner = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("TLS backend initialization should never fail");

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(RETRY_BASE, RETRY_BASE * 32)
        .build_with_max_retries(MAX_RETRIES);

    ClientBuilder::new(inner)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_panicking() {
        let _client = build_client("opensourcescore/0.1 (+https://opensourcescore.dev)");
    }
}
