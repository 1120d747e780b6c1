//! Raw error produced by a single fetch attempt.

use thiserror::Error;

/// Error returned by one `Fetcher::fetch` call.
/// Kept raw so the classifier can decide retries before anything is logged or
/// propagated; fatal ones reach the caller unchanged.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (timeout, connection, proxy, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Socket-level I/O failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Non-2xx response; `body` is a short prefix of the response body.
    #[error("HTTP {status}: {body}")]
    Http { status: u32, body: String },
    /// Network-path failure reported by a fetcher without a richer error type.
    #[error("network: {0}")]
    Network(String),
    /// The source (or something in front of it) is shielding itself from traffic.
    #[error("DDoS protection: {0}")]
    DdosProtection(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("timed out: {0}")]
    Timeout(String),
    /// Bad or missing credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Maintenance, overload, geo-block.
    #[error("source not available: {0}")]
    SourceUnavailable(String),
    /// Malformed response or unsupported operation.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The per-source deadline ran out before the first attempt could start.
    #[error("source deadline exceeded before the first attempt")]
    DeadlineExceeded,
    /// Anything else. Never retried.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FetchError {
    /// Build an `Http` error, truncating the body to keep logs readable.
    pub fn http(status: u32, body: &[u8]) -> Self {
        const MAX_BODY: usize = 200;
        let text = String::from_utf8_lossy(&body[..body.len().min(MAX_BODY)]);
        FetchError::Http {
            status,
            body: text.trim().to_string(),
        }
    }
}
