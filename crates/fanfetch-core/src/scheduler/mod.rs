//! Fetch orchestrator.
//!
//! Launches one retry controller per source on the tokio runtime, waits for
//! all of them, and aggregates the per-source results. Sources share nothing
//! mutable: the endpoint pool and the fetcher are read-only behind `Arc`, each
//! source is moved into its own task, and results come back through the join
//! handles.

mod report;
mod run;

pub use report::{FatalRun, RunCounts, RunReport, SourceReport};
pub use run::{run_all, RunOptions};
