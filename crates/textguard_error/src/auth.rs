//! Credential resolution errors.

/// Reasons a credential could not be mapped to a tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AuthErrorKind {
    /// No credential was supplied
    #[display("API key is required")]
    MissingCredential,
    /// The credential is not known to the registry
    #[display("Invalid API key")]
    UnknownCredential,
}

/// Authentication error with location tracking.
///
/// # Examples
///
/// ```
/// use textguard_error::{AuthError, AuthErrorKind};
///
/// let err = AuthError::new(AuthErrorKind::MissingCredential);
/// assert!(format!("{}", err).contains("required"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of error that occurred
    pub kind: AuthErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuthError {
    /// Create a new auth error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
