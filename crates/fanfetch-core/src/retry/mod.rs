//! Failure classification and per-source endpoint failover.
//!
//! This module encapsulates error classification (connection failures,
//! throttling, timeouts, credential and protocol errors) and the retry
//! controller state machine that rotates a source through the endpoint pool.
//! The pool size is the whole retry budget; there is no backoff.

mod classify;
mod error;
mod outcome;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status, classify_io_error};
pub use error::FetchError;
pub use outcome::{AttemptOutcome, AttemptRecord, RunResult};
pub use policy::{ClassifierPolicy, ControllerState, FailoverPolicy, FailureCategory};
pub use run::{ControllerRun, RetryController};
