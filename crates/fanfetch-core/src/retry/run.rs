//! Retry controller: drive one source through the endpoint pool until it
//! loads, exhausts the pool, or hits a fatal failure.

use std::time::Instant;

use super::classify;
use super::error::FetchError;
use super::outcome::{AttemptOutcome, AttemptRecord, RunResult};
use super::policy::{ControllerState, FailoverPolicy, FailureCategory};
use crate::endpoint::{Endpoint, EndpointPool};
use crate::fetch::Fetcher;
use crate::source::Source;

/// Everything a controller hands back when it reaches a terminal state.
#[derive(Debug)]
pub struct ControllerRun {
    /// The source, with its dataset set if it loaded.
    pub source: Source,
    pub result: RunResult,
    pub attempts: Vec<AttemptRecord>,
    /// Original error of an aborted run, to be propagated by the caller.
    pub error: Option<FetchError>,
    pub finished_at: Instant,
}

/// Per-source state machine. Borrowed pool, owned cursor.
#[derive(Debug, Clone, Copy)]
pub struct RetryController<'a> {
    pool: &'a EndpointPool,
    policy: &'a FailoverPolicy,
}

impl<'a> RetryController<'a> {
    pub fn new(pool: &'a EndpointPool, policy: &'a FailoverPolicy) -> Self {
        Self { pool, policy }
    }

    /// Run the controller to completion. At most `pool.size()` attempts are made.
    pub async fn run(&self, mut source: Source, fetcher: &dyn Fetcher) -> ControllerRun {
        source.clear_dataset();
        let pool_size = self.pool.size();
        let started = Instant::now();
        let mut state = ControllerState::Idle;
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(pool_size);
        let mut aborted: Option<(FailureCategory, FetchError)> = None;

        while !state.is_terminal() {
            let ControllerState::Attempting { cursor } = state else {
                state = state.advance();
                continue;
            };

            if let Some(deadline) = self.policy.source_deadline {
                if started.elapsed() >= deadline {
                    if attempts.is_empty() {
                        tracing::warn!(source = %source.id(), "deadline exceeded before first attempt");
                        aborted = Some((FailureCategory::Fatal, FetchError::DeadlineExceeded));
                        state = ControllerState::Aborted;
                    } else {
                        tracing::warn!(
                            source = %source.id(),
                            attempts = attempts.len(),
                            "deadline exceeded, giving up on remaining endpoints"
                        );
                        state = ControllerState::Exhausted;
                    }
                    continue;
                }
            }

            let endpoint = self.pool.endpoint_at(cursor);
            let attempt_started = Instant::now();
            let outcome = self.attempt(&source, endpoint, fetcher).await;
            let mut record = AttemptRecord {
                cursor,
                endpoint: endpoint.to_string(),
                category: outcome.category(),
                message: None,
                elapsed: attempt_started.elapsed(),
            };

            state = match outcome {
                AttemptOutcome::Success(dataset) => {
                    tracing::info!(
                        source = %source.id(),
                        endpoint = %endpoint,
                        attempt = attempts.len() + 1,
                        "loaded {} identifiers",
                        dataset.len()
                    );
                    source.set_dataset(dataset);
                    attempts.push(record);
                    ControllerState::Succeeded
                }
                AttemptOutcome::Failure { category, error } => {
                    record.message = Some(error.to_string());
                    attempts.push(record);
                    let next = ControllerState::after_failure(
                        cursor,
                        attempts.len(),
                        category,
                        pool_size,
                        &self.policy.classifier,
                    );
                    tracing::warn!(
                        source = %source.id(),
                        endpoint = %endpoint,
                        attempt = attempts.len(),
                        category = ?category,
                        "[{}] {}",
                        category.label(),
                        error
                    );
                    match next {
                        ControllerState::Aborted => aborted = Some((category, error)),
                        ControllerState::Exhausted => {
                            tracing::warn!(
                                source = %source.id(),
                                attempts = attempts.len(),
                                "all endpoints exhausted"
                            );
                        }
                        _ => {}
                    }
                    next
                }
            };
        }

        let (result, error) = match (state, aborted) {
            (ControllerState::Succeeded, _) => match source.dataset() {
                Some(d) => (RunResult::Loaded(d.clone()), None),
                None => (RunResult::Exhausted, None),
            },
            (ControllerState::Aborted, Some((category, error))) => (
                RunResult::Aborted {
                    category,
                    message: error.to_string(),
                },
                Some(error),
            ),
            _ => (RunResult::Exhausted, None),
        };

        ControllerRun {
            source,
            result,
            attempts,
            error,
            finished_at: Instant::now(),
        }
    }

    /// One fetch through `endpoint`, bounded by the attempt timeout if set.
    async fn attempt(
        &self,
        source: &Source,
        endpoint: &Endpoint,
        fetcher: &dyn Fetcher,
    ) -> AttemptOutcome {
        let fetched = match self.policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetcher.fetch(source, endpoint)).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::Timeout(format!(
                    "attempt exceeded {} ms",
                    limit.as_millis()
                ))),
            },
            None => fetcher.fetch(source, endpoint).await,
        };
        match fetched {
            Ok(dataset) => AttemptOutcome::Success(dataset),
            Err(error) => AttemptOutcome::Failure {
                category: classify::classify(&error),
                error,
            },
        }
    }
}
