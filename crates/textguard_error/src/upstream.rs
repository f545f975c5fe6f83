//! Remote call failures and retry classification.

use std::fmt;

/// Transport-level failure (connection refused, reset, timeout).
///
/// Surfaced only once the retry budget is exhausted; `attempts` records how
/// many calls were made.
///
/// # Examples
///
/// ```
/// use textguard_error::{NetworkError, RetryableError};
///
/// let err = NetworkError::new("connection reset by peer", 3);
/// assert!(err.is_retryable());
/// assert_eq!(err.attempts, 3);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display(
    "Network Error: {} after {} attempt(s) at line {} in {}",
    message,
    attempts,
    line,
    file
)]
pub struct NetworkError {
    /// Description of the last transport failure
    pub message: String,
    /// Number of attempts made before giving up
    pub attempts: u32,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NetworkError {
    /// Create a new NetworkError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>, attempts: u32) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            attempts,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// The remote service answered with something other than a usable success.
///
/// `status` is `None` when the response was 2xx but its body could not be
/// parsed.
///
/// # Examples
///
/// ```
/// use textguard_error::{RetryableError, UpstreamError};
///
/// let err = UpstreamError::new(Some(400), false, "bad request", 1);
/// assert!(!err.is_retryable());
/// assert!(format!("{}", err).contains("400"));
/// ```
#[derive(Debug, Clone, derive_more::Error)]
pub struct UpstreamError {
    /// HTTP status returned by the service, if any
    pub status: Option<u16>,
    /// Whether another attempt could plausibly succeed
    pub retryable: bool,
    /// Response body or parse failure description
    pub detail: String,
    /// Number of attempts made
    pub attempts: u32,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError at the current location.
    #[track_caller]
    pub fn new(
        status: Option<u16>,
        retryable: bool,
        detail: impl Into<String>,
        attempts: u32,
    ) -> Self {
        let location = std::panic::Location::caller();
        Self {
            status,
            retryable,
            detail: detail.into(),
            attempts,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.retryable { "retryable" } else { "fatal" };
        match self.status {
            Some(status) => write!(f, "Upstream Error: HTTP {} ({})", status, class)?,
            None => write!(f, "Upstream Error: malformed response ({})", class)?,
        }
        write!(
            f,
            ": {} after {} attempt(s) at line {} in {}",
            self.detail, self.attempts, self.line, self.file
        )
    }
}

/// The caller cancelled the work or its deadline passed.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cancelled: {} at line {} in {}", reason, line, file)]
pub struct CancelledError {
    /// Why the work stopped
    pub reason: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl CancelledError {
    /// Create a new CancelledError at the current location.
    #[track_caller]
    pub fn new(reason: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            reason: reason.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient failures like dropped connections or rate limiting return
/// true. Permanent failures like 400 (bad request) or 401 (unauthorized)
/// return false.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for NetworkError {
    fn is_retryable(&self) -> bool {
        true
    }
}

impl RetryableError for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl RetryableError for CancelledError {
    fn is_retryable(&self) -> bool {
        false
    }
}
