//! Fan out one retry controller per source, fan in when all are terminal.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use super::report::{FatalRun, RunReport, SourceReport};
use crate::endpoint::EndpointPool;
use crate::fetch::Fetcher;
use crate::retry::{
    ControllerRun, FailoverPolicy, FailureCategory, FetchError, RetryController, RunResult,
};
use crate::source::Source;

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub failover: FailoverPolicy,
    /// Upper bound on sources fetched at once (`None` = all at once).
    pub max_concurrent_sources: Option<usize>,
}

/// Fetch every source concurrently, each through its own retry controller.
///
/// Waits for all controllers to finish; an aborted source never cancels or
/// delays the others. If any source aborted, returns `FatalRun` for the first
/// one (input order) together with the full report.
pub async fn run_all(
    sources: Vec<Source>,
    pool: Arc<EndpointPool>,
    fetcher: Arc<dyn Fetcher>,
    options: RunOptions,
) -> Result<RunReport, FatalRun> {
    let semaphore = options
        .max_concurrent_sources
        .map(|n| Arc::new(Semaphore::new(n.max(1))));
    tracing::info!(
        sources = sources.len(),
        endpoints = pool.size(),
        "starting fetch run"
    );

    let mut handles = Vec::with_capacity(sources.len());
    for source in sources {
        // Kept so a panicked task can still be reported under its source.
        let fallback = source.clone();
        let pool = Arc::clone(&pool);
        let fetcher = Arc::clone(&fetcher);
        let semaphore = semaphore.clone();
        let policy = options.failover;
        let handle = tokio::spawn(async move {
            let _permit = match semaphore {
                Some(s) => s.acquire_owned().await.ok(),
                None => None,
            };
            RetryController::new(&pool, &policy)
                .run(source, fetcher.as_ref())
                .await
        });
        handles.push((fallback, handle));
    }

    let mut runs = Vec::with_capacity(handles.len());
    for (fallback, handle) in handles {
        let run = match handle.await {
            Ok(run) => run,
            Err(e) => {
                tracing::error!(source = %fallback.id(), "fetch task failed: {}", e);
                let error = FetchError::Other(anyhow::anyhow!(
                    "fetch task for {} failed: {}",
                    fallback.id(),
                    e
                ));
                ControllerRun {
                    result: RunResult::Aborted {
                        category: FailureCategory::Fatal,
                        message: error.to_string(),
                    },
                    source: fallback,
                    attempts: Vec::new(),
                    error: Some(error),
                    finished_at: Instant::now(),
                }
            }
        };
        runs.push(run);
    }

    let mut first_fatal = None;
    let mut reports = Vec::with_capacity(runs.len());
    for run in runs {
        if let Some(error) = run.error {
            if first_fatal.is_none() {
                first_fatal = Some((run.source.id().clone(), error));
            }
        }
        reports.push(SourceReport {
            source: run.source,
            result: run.result,
            attempts: run.attempts,
            finished_at: run.finished_at,
        });
    }
    let report = RunReport::new(reports);

    let counts = report.counts();
    tracing::info!(
        loaded = counts.loaded,
        exhausted = counts.exhausted,
        aborted = counts.aborted,
        "fetch run finished"
    );

    match first_fatal {
        Some((source_id, error)) => Err(FatalRun {
            source_id,
            error,
            report,
        }),
        None => Ok(report),
    }
}
