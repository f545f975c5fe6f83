//! Per-invocation attempt records.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use textguard_core::AnalysisResult;

/// How one remote attempt ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum AttemptOutcome {
    /// The service answered with a usable result
    #[display("success")]
    Success,
    /// Rate-limited or transport failure; another attempt followed
    #[display("retryable failure")]
    RetryableFailure,
}

/// One remote attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RequestAttempt {
    /// 1-based attempt number
    attempt_number: u32,
    /// How the attempt ended
    outcome: AttemptOutcome,
    /// Pause taken after this attempt, if another followed
    backoff_delay: Option<Duration>,
}

impl RequestAttempt {
    pub(crate) fn new(attempt_number: u32, outcome: AttemptOutcome) -> Self {
        Self {
            attempt_number,
            outcome,
            backoff_delay: None,
        }
    }

    pub(crate) fn with_backoff(mut self, delay: Duration) -> Self {
        self.backoff_delay = Some(delay);
        self
    }
}

/// A successful invocation together with its attempt log.
///
/// Cache hits carry an empty attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct InvocationReport {
    /// The analysis
    result: AnalysisResult,
    /// Remote attempts made, in order
    attempts: Vec<RequestAttempt>,
    /// Whether the result came from the cache
    from_cache: bool,
}

impl InvocationReport {
    pub(crate) fn cached(result: AnalysisResult) -> Self {
        Self {
            result,
            attempts: Vec::new(),
            from_cache: true,
        }
    }

    pub(crate) fn fetched(result: AnalysisResult, attempts: Vec<RequestAttempt>) -> Self {
        Self {
            result,
            attempts,
            from_cache: false,
        }
    }

    /// Consumes the report, keeping only the analysis.
    pub fn into_result(self) -> AnalysisResult {
        self.result
    }
}
