//! Per-source reports collected after the fan-in barrier.

use std::time::Instant;
use thiserror::Error;

use crate::retry::{AttemptRecord, FetchError, RunResult};
use crate::source::{Source, SourceId};

/// Terminal record for one source.
#[derive(Debug)]
pub struct SourceReport {
    pub source: Source,
    pub result: RunResult,
    pub attempts: Vec<AttemptRecord>,
    /// When the controller reached its terminal state.
    pub finished_at: Instant,
}

impl SourceReport {
    pub fn id(&self) -> &SourceId {
        self.source.id()
    }
}

/// Loaded / exhausted / aborted counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub loaded: usize,
    pub exhausted: usize,
    pub aborted: usize,
}

/// Every source's terminal record, in the order sources were given.
#[derive(Debug, Default)]
pub struct RunReport {
    reports: Vec<SourceReport>,
}

impl RunReport {
    pub(crate) fn new(reports: Vec<SourceReport>) -> Self {
        Self { reports }
    }

    pub fn get(&self, id: &str) -> Option<&SourceReport> {
        self.reports.iter().find(|r| r.id().as_str() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceReport> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn counts(&self) -> RunCounts {
        let mut counts = RunCounts::default();
        for r in &self.reports {
            match r.result {
                RunResult::Loaded(_) => counts.loaded += 1,
                RunResult::Exhausted => counts.exhausted += 1,
                RunResult::Aborted { .. } => counts.aborted += 1,
            }
        }
        counts
    }

    /// Hand the sources back (with datasets set where loaded).
    pub fn into_sources(self) -> Vec<Source> {
        self.reports.into_iter().map(|r| r.source).collect()
    }
}

/// A run in which at least one source aborted on a fatal failure.
///
/// Returned only after every source reached a terminal state; `report`
/// holds all of them, including the aborted ones.
#[derive(Debug, Error)]
#[error("source {source_id} aborted: {error}")]
pub struct FatalRun {
    /// First aborted source in input order.
    pub source_id: SourceId,
    #[source]
    pub error: FetchError,
    pub report: RunReport,
}
