//! fanfetch core: fetch a dataset from many independent sources at once,
//! rotating each source through a pool of transport endpoints on transient
//! failures and surfacing fatal ones after every source has finished.
//!
//! Pipeline: config → endpoint pool + sources → scheduler (one task per
//! source) → retry controller → fetcher → classifier → run report.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod retry;
pub mod scheduler;
pub mod source;
pub mod summary;

pub use endpoint::{Endpoint, EndpointPool};
pub use error::ConfigurationError;
pub use fetch::{Fetcher, HttpFetcher};
pub use retry::{FailureCategory, FetchError, RunResult};
pub use scheduler::{run_all, FatalRun, RunOptions, RunReport};
pub use source::{Dataset, Source, SourceId};
