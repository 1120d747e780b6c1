//! The fetch capability: the only I/O boundary the scheduler depends on.
//!
//! A `Fetcher` turns (source, endpoint) into a `Dataset` or a raw
//! `FetchError`. The bundled `HttpFetcher` speaks HTTP + JSON through libcurl;
//! tests and embedders can plug in their own.

mod http;
mod parse;

pub use http::{HttpFetcher, HttpFetcherOptions};
pub use parse::parse_identifiers;

use std::future::Future;
use std::pin::Pin;

use crate::endpoint::Endpoint;
use crate::retry::FetchError;
use crate::source::{Dataset, Source};

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Dataset, FetchError>> + Send + 'a>>;

/// Fetch one source's dataset through one endpoint.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, source: &'a Source, endpoint: &'a Endpoint) -> FetchFuture<'a>;
}
