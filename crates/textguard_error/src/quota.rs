//! Quota and batch ceiling errors.

/// Tier policy violations detected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum QuotaErrorKind {
    /// The tier's daily request budget cannot cover the request
    #[display(
        "Daily quota exhausted for tier '{}' ({} requests/day, requested {}, resets at {})",
        tier,
        limit,
        requested,
        reset_time
    )]
    Exceeded {
        /// Tier name
        tier: String,
        /// Requests per day granted to the tier
        limit: u64,
        /// Units the caller tried to reserve
        requested: u64,
        /// RFC 3339 timestamp of the next window reset
        reset_time: String,
    },
    /// A batch is larger than the tier allows
    #[display(
        "Batch of {} items exceeds the maximum of {} for tier '{}'",
        requested,
        max,
        tier
    )]
    BatchTooLarge {
        /// Tier name
        tier: String,
        /// Number of items submitted
        requested: usize,
        /// Maximum batch size for the tier
        max: usize,
    },
}

/// Quota error with location tracking.
///
/// # Examples
///
/// ```
/// use textguard_error::{QuotaError, QuotaErrorKind};
///
/// let err = QuotaError::new(QuotaErrorKind::BatchTooLarge {
///     tier: "free".to_string(),
///     requested: 20,
///     max: 10,
/// });
/// assert!(format!("{}", err).contains("exceeds the maximum of 10"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Quota Error: {} at line {} in {}", kind, line, file)]
pub struct QuotaError {
    /// The kind of error that occurred
    pub kind: QuotaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QuotaError {
    /// Create a new quota error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QuotaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
