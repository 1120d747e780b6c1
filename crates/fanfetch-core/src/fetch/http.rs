//! HTTP + JSON fetcher built on libcurl.
//!
//! Sends a GET for the source URL through the given endpoint (URL prefix or
//! transport proxy), with credential fields as request headers, and extracts
//! identifiers from the JSON body. Curl runs on the blocking pool.

use std::time::Duration;

use super::parse::parse_identifiers;
use super::{FetchFuture, Fetcher};
use crate::endpoint::Endpoint;
use crate::retry::FetchError;
use crate::source::Source;

/// Transport settings for `HttpFetcher`.
#[derive(Debug, Clone)]
pub struct HttpFetcherOptions {
    pub connect_timeout: Duration,
    /// Whole-request timeout enforced by curl.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpFetcherOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            user_agent: concat!("fanfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    options: HttpFetcherOptions,
}

/// Owned request description, moved onto the blocking pool.
struct Request {
    url: String,
    proxy: Option<String>,
    headers: Vec<String>,
    pointer: String,
    id_field: String,
}

impl HttpFetcher {
    pub fn new(options: HttpFetcherOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HttpFetcherOptions {
        &self.options
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, source: &'a Source, endpoint: &'a Endpoint) -> FetchFuture<'a> {
        let request = Request {
            url: endpoint.request_url(source.url()),
            proxy: endpoint.transport_proxy().map(str::to_string),
            headers: source
                .credentials()
                .iter()
                .map(|(k, v)| format!("{}: {}", k.trim(), v.trim()))
                .collect(),
            pointer: source.identifiers_pointer.clone(),
            id_field: source.id_field.clone(),
        };
        let options = self.options.clone();
        Box::pin(async move {
            let Request {
                url,
                proxy,
                headers,
                pointer,
                id_field,
            } = request;
            tracing::debug!(url = %url, proxy = ?proxy, "GET");
            let (status, body) = tokio::task::spawn_blocking(move || {
                perform_get(&url, proxy.as_deref(), &headers, &options)
            })
            .await
            .map_err(|e| FetchError::Other(anyhow::anyhow!("fetch task join: {}", e)))??;

            if !(200..300).contains(&status) {
                return Err(FetchError::http(status, &body));
            }
            parse_identifiers(&body, &pointer, &id_field)
        })
    }
}

/// Blocking GET. Returns the status code and full body.
fn perform_get(
    url: &str,
    proxy: Option<&str>,
    headers: &[String],
    options: &HttpFetcherOptions,
) -> Result<(u32, Vec<u8>), FetchError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(options.connect_timeout)?;
    easy.timeout(options.timeout)?;
    easy.useragent(&options.user_agent)?;
    if let Some(proxy) = proxy {
        easy.proxy(proxy)?;
    }

    if !headers.is_empty() {
        let mut list = curl::easy::List::new();
        for h in headers {
            list.append(h)?;
        }
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok((status, body))
}
