use serde::Serialize;
use std::time::Duration;

/// Closed set of failure categories a fetch attempt can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Connection reset, DNS, proxy resolution, socket errors.
    Network,
    /// DDoS protection or explicit rate limiting.
    RateLimited,
    /// Connect/read timeout or attempt deadline.
    Timeout,
    /// Bad or missing credentials.
    Unauthenticated,
    /// Maintenance, overload, geo-block.
    SourceUnavailable,
    /// Malformed response, unsupported operation, other 4xx.
    SourceProtocol,
    /// Unrecognized error.
    Fatal,
}

impl FailureCategory {
    /// Whether another endpoint may fix this failure.
    pub fn is_retryable(self, policy: &ClassifierPolicy) -> bool {
        match self {
            FailureCategory::Network | FailureCategory::RateLimited | FailureCategory::Timeout => {
                true
            }
            FailureCategory::SourceUnavailable => policy.retry_unavailable,
            FailureCategory::Unauthenticated
            | FailureCategory::SourceProtocol
            | FailureCategory::Fatal => false,
        }
    }

    /// Human-readable label used in logs and summaries.
    pub fn label(self) -> &'static str {
        match self {
            FailureCategory::Network => "Network Error",
            FailureCategory::RateLimited => "DDoS Protection Error",
            FailureCategory::Timeout => "Timeout Error",
            FailureCategory::Unauthenticated => "Authentication Error",
            FailureCategory::SourceUnavailable => "Source Not Available Error",
            FailureCategory::SourceProtocol => "Source Error",
            FailureCategory::Fatal => "Unrecognized Error",
        }
    }
}

/// Knobs that change how categories map to retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierPolicy {
    /// Treat "source unavailable" as retryable through another endpoint
    /// (a different egress IP can get around geo-blocks; often it cannot).
    pub retry_unavailable: bool,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            retry_unavailable: true,
        }
    }
}

/// Everything a retry controller needs besides the pool itself.
///
/// There is no backoff: the pool size is the retry budget and each endpoint is
/// tried at most once per source per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailoverPolicy {
    pub classifier: ClassifierPolicy,
    /// Cancel an attempt that runs longer than this and classify it as `Timeout`.
    pub attempt_timeout: Option<Duration>,
    /// Stop starting new attempts for a source once this much time has passed.
    ///
    /// Checked only between attempts: an attempt already running is bounded by
    /// `attempt_timeout` (or the fetcher's own timeout), so a source with only
    /// a deadline can overrun it by up to one full request.
    pub source_deadline: Option<Duration>,
}

/// Retry controller state machine.
///
/// `Idle → Attempting → {Succeeded | Retrying → Attempting | Exhausted | Aborted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Attempting { cursor: usize },
    Retrying { cursor: usize },
    Succeeded,
    Exhausted,
    Aborted,
}

impl ControllerState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ControllerState::Succeeded | ControllerState::Exhausted | ControllerState::Aborted
        )
    }

    /// Transition for every state that does not depend on an attempt result.
    /// `Attempting` and terminal states are returned unchanged.
    pub fn advance(self) -> Self {
        match self {
            ControllerState::Idle => ControllerState::Attempting { cursor: 0 },
            ControllerState::Retrying { cursor } => ControllerState::Attempting { cursor },
            other => other,
        }
    }

    /// Transition after the attempt at `cursor` failed with `category`.
    ///
    /// `attempts` counts attempts made so far, including the failed one.
    pub fn after_failure(
        cursor: usize,
        attempts: usize,
        category: FailureCategory,
        pool_size: usize,
        policy: &ClassifierPolicy,
    ) -> Self {
        if !category.is_retryable(policy) {
            return ControllerState::Aborted;
        }
        if attempts >= pool_size {
            return ControllerState::Exhausted;
        }
        ControllerState::Retrying {
            cursor: (cursor + 1) % pool_size.max(1),
        }
    }
}
