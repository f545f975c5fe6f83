//! Top-level error wrapper types.

use crate::{
    AuthError, BatchError, CancelledError, ConfigError, HttpError, JsonError, NetworkError,
    QuotaError, QuotaErrorKind, RetryableError, UpstreamError,
};

/// Every failure the analysis client can report.
///
/// # Examples
///
/// ```
/// use textguard_error::{TextGuardError, NetworkError};
///
/// let err: TextGuardError = NetworkError::new("Connection failed", 3).into();
/// assert!(format!("{}", err).contains("Network Error"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TextGuardErrorKind {
    /// Credential could not be resolved to a tier
    #[from(AuthError)]
    Auth(AuthError),
    /// Tier budget exhausted or batch ceiling exceeded
    #[from(QuotaError)]
    Quota(QuotaError),
    /// Transport failure after retries were exhausted
    #[from(NetworkError)]
    Network(NetworkError),
    /// Remote service returned a non-success response
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Caller aborted before completion
    #[from(CancelledError)]
    Cancelled(CancelledError),
    /// Batch task failed outside the executor
    #[from(BatchError)]
    Batch(BatchError),
    /// Single transport failure, before retry accounting
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

impl TextGuardErrorKind {
    /// Suggested HTTP status for callers that surface errors over HTTP.
    ///
    /// Quota exhaustion maps to 429 and unresolvable credentials to 401;
    /// everything that went wrong talking to the service is a gateway error.
    pub fn status_hint(&self) -> u16 {
        match self {
            TextGuardErrorKind::Auth(_) => 401,
            TextGuardErrorKind::Quota(e) => match e.kind {
                QuotaErrorKind::Exceeded { .. } => 429,
                QuotaErrorKind::BatchTooLarge { .. } => 413,
            },
            TextGuardErrorKind::Network(_) | TextGuardErrorKind::Http(_) => 504,
            TextGuardErrorKind::Upstream(_) => 502,
            TextGuardErrorKind::Cancelled(_) => 499,
            TextGuardErrorKind::Batch(_)
            | TextGuardErrorKind::Config(_)
            | TextGuardErrorKind::Json(_) => 500,
        }
    }
}

/// TextGuard error with kind discrimination.
///
/// # Examples
///
/// ```
/// use textguard_error::{TextGuardResult, ConfigError};
///
/// fn might_fail() -> TextGuardResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert_eq!(err.kind().status_hint(), 500);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("TextGuard Error: {}", _0)]
pub struct TextGuardError(Box<TextGuardErrorKind>);

impl TextGuardError {
    /// Create a new error from a kind.
    pub fn new(kind: TextGuardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TextGuardErrorKind {
        &self.0
    }

    /// Number of remote attempts made before this error, when known.
    pub fn attempts(&self) -> Option<u32> {
        match self.kind() {
            TextGuardErrorKind::Network(e) => Some(e.attempts),
            TextGuardErrorKind::Upstream(e) => Some(e.attempts),
            _ => None,
        }
    }
}

impl RetryableError for TextGuardError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            TextGuardErrorKind::Network(e) => e.is_retryable(),
            TextGuardErrorKind::Http(_) => true,
            TextGuardErrorKind::Upstream(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl<T> From<T> for TextGuardError
where
    T: Into<TextGuardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for TextGuard operations.
pub type TextGuardResult<T> = std::result::Result<T, TextGuardError>;
