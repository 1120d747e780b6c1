//! Pre-run configuration errors.
//!
//! Anything reported here is detected before the first fetch starts; a run
//! never begins with a half-valid pool or source list.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The endpoint pool must contain at least one entry (use `""` for direct).
    #[error("endpoint pool is empty; add at least one endpoint (\"\" means direct)")]
    EmptyEndpointPool,

    /// A prefix or proxy entry is not an absolute URL.
    #[error("endpoint #{index} ({value:?}) is not a valid URL: {reason}")]
    InvalidEndpoint {
        index: usize,
        value: String,
        reason: String,
    },

    #[error("source #{index} has an empty id")]
    EmptySourceId { index: usize },

    #[error("source id {0:?} is declared more than once")]
    DuplicateSource(String),

    #[error("source {id:?}: invalid url {url:?}: {reason}")]
    InvalidSourceUrl {
        id: String,
        url: String,
        reason: String,
    },

    /// Credentials were supplied for a source that is not configured.
    #[error("credentials given for unknown source {0:?}")]
    UnknownCredentialSource(String),

    /// Credential values must be strings (they are sent as header values).
    #[error("credential {field:?} for source {source_id:?} must be a string")]
    InvalidCredential { source_id: String, field: String },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
}
