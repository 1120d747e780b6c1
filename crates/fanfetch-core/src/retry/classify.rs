//! Classify fetch errors (curl, I/O, HTTP status, typed source errors) into
//! failure categories. First matching rule wins.

use std::io;

use super::error::FetchError;
use super::policy::FailureCategory;

/// Classify a fetch error into a `FailureCategory`.
pub fn classify(e: &FetchError) -> FailureCategory {
    // Some transports only surface resets as text, on any error kind.
    if mentions_reset(e) {
        return FailureCategory::Network;
    }
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Io(ie) => classify_io_error(ie),
        FetchError::Http { status, body } => classify_http_status(*status, body),
        FetchError::Network(_) => FailureCategory::Network,
        FetchError::DdosProtection(_) | FetchError::RateLimited(_) => FailureCategory::RateLimited,
        FetchError::Timeout(_) => FailureCategory::Timeout,
        FetchError::Authentication(_) => FailureCategory::Unauthenticated,
        FetchError::SourceUnavailable(_) => FailureCategory::SourceUnavailable,
        FetchError::Protocol(_) => FailureCategory::SourceProtocol,
        FetchError::DeadlineExceeded | FetchError::Other(_) => FailureCategory::Fatal,
    }
}

/// True if the error or anything in its source chain names `ECONNRESET`.
fn mentions_reset(e: &FetchError) -> bool {
    const RESET: &str = "ECONNRESET";
    if let FetchError::Other(other) = e {
        if format!("{:#}", other).contains(RESET) {
            return true;
        }
    }
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = current {
        if err.to_string().contains(RESET) {
            return true;
        }
        current = err.source();
    }
    false
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FailureCategory {
    if e.is_operation_timedout() {
        return FailureCategory::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
        || e.is_partial_file()
    {
        return FailureCategory::Network;
    }
    FailureCategory::Fatal
}

/// Classify a socket-level I/O error.
pub fn classify_io_error(e: &io::Error) -> FailureCategory {
    match e.kind() {
        io::ErrorKind::TimedOut => FailureCategory::Timeout,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => FailureCategory::Network,
        _ => FailureCategory::Fatal,
    }
}

/// Classify a non-2xx HTTP status. `body` is used to spot DDoS-protection pages
/// that come back as 403/503.
pub fn classify_http_status(status: u32, body: &str) -> FailureCategory {
    match status {
        429 => FailureCategory::RateLimited,
        408 | 504 => FailureCategory::Timeout,
        403 | 503 if looks_like_ddos_protection(body) => FailureCategory::RateLimited,
        401 | 403 => FailureCategory::Unauthenticated,
        500..=599 => FailureCategory::SourceUnavailable,
        _ => FailureCategory::SourceProtocol,
    }
}

fn looks_like_ddos_protection(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    ["cloudflare", "ddos", "incapsula", "rate limit"]
        .iter()
        .any(|marker| lower.contains(marker))
}
