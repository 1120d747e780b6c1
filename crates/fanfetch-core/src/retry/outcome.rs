//! Per-attempt and per-source outcomes produced by the retry controller.

use serde::Serialize;
use std::time::Duration;

use super::error::FetchError;
use super::policy::FailureCategory;
use crate::source::Dataset;

/// Result of one fetch attempt, consumed immediately by the controller.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Dataset),
    Failure {
        category: FailureCategory,
        error: FetchError,
    },
}

impl AttemptOutcome {
    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::Failure { category, .. } => Some(*category),
        }
    }
}

/// Log entry for one attempt, kept in the source report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// Pool index used for this attempt.
    pub cursor: usize,
    pub endpoint: String,
    /// `None` on success.
    pub category: Option<FailureCategory>,
    pub message: Option<String>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

/// Terminal state of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunResult {
    Loaded(Dataset),
    /// Every endpoint (or the deadline) was used up on retryable failures.
    Exhausted,
    /// A fatal failure stopped the controller.
    Aborted {
        category: FailureCategory,
        message: String,
    },
}

impl RunResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, RunResult::Loaded(_))
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            RunResult::Loaded(d) => Some(d),
            RunResult::Exhausted | RunResult::Aborted { .. } => None,
        }
    }

    /// Short label for summaries: `loaded`, `exhausted`, `aborted`.
    pub fn label(&self) -> &'static str {
        match self {
            RunResult::Loaded(_) => "loaded",
            RunResult::Exhausted => "exhausted",
            RunResult::Aborted { .. } => "aborted",
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
