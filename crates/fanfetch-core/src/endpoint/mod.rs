//! Transport endpoints and the round-robin endpoint pool.
//!
//! An endpoint describes *how* a source is reached: directly, through a URL
//! prefix (CORS-style relay that takes the target URL appended to its own), or
//! through a transport-level HTTP/SOCKS proxy.

mod pool;

pub use pool::EndpointPool;

use std::fmt;

use crate::error::ConfigurationError;

/// One way of reaching a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// No intermediary.
    Direct,
    /// Relay URL; the request URL is appended to it verbatim.
    Prefix(String),
    /// Transport proxy passed to the HTTP client (e.g. `socks5h://127.0.0.1:9050`).
    Proxy(String),
}

impl Endpoint {
    /// Parse a descriptor string: empty means direct, anything else is a prefix.
    pub fn from_descriptor(index: usize, descriptor: &str) -> Result<Self, ConfigurationError> {
        let trimmed = descriptor.trim();
        if trimmed.is_empty() {
            return Ok(Endpoint::Direct);
        }
        validate_url(index, trimmed)?;
        Ok(Endpoint::Prefix(trimmed.to_string()))
    }

    /// Build a proxy endpoint, validating the proxy URL.
    pub fn proxy(index: usize, proxy_url: &str) -> Result<Self, ConfigurationError> {
        let trimmed = proxy_url.trim();
        validate_url(index, trimmed)?;
        Ok(Endpoint::Proxy(trimmed.to_string()))
    }

    /// Final request URL for `target` when sent through this endpoint.
    pub fn request_url(&self, target: &str) -> String {
        match self {
            Endpoint::Prefix(prefix) => format!("{}{}", prefix, target),
            Endpoint::Direct | Endpoint::Proxy(_) => target.to_string(),
        }
    }

    /// Proxy to hand to the transport, if any.
    pub fn transport_proxy(&self) -> Option<&str> {
        match self {
            Endpoint::Proxy(p) => Some(p),
            Endpoint::Direct | Endpoint::Prefix(_) => None,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Endpoint::Direct)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Direct => write!(f, "direct"),
            Endpoint::Prefix(p) => write!(f, "prefix {}", p),
            Endpoint::Proxy(p) => write!(f, "proxy {}", p),
        }
    }
}

fn validate_url(index: usize, value: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidEndpoint {
        index,
        value: value.to_string(),
        reason,
    };
    let parsed = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}
