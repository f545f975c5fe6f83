//! Error types for the TextGuard analysis client.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! The top-level [`TextGuardErrorKind`] keeps the caller-facing taxonomy
//! distinct: credential failures, quota exhaustion, transport failures,
//! upstream rejections and cancellation never collapse into one another.
//!
//! # Examples
//!
//! ```
//! use textguard_error::{TextGuardErrorKind, TextGuardResult, AuthError, AuthErrorKind};
//!
//! fn resolve() -> TextGuardResult<String> {
//!     Err(AuthError::new(AuthErrorKind::UnknownCredential))?
//! }
//!
//! let err = resolve().unwrap_err();
//! assert!(matches!(err.kind(), TextGuardErrorKind::Auth(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod batch;
mod config;
mod error;
mod http;
mod json;
mod quota;
mod upstream;

pub use auth::{AuthError, AuthErrorKind};
pub use batch::BatchError;
pub use config::ConfigError;
pub use error::{TextGuardError, TextGuardErrorKind, TextGuardResult};
pub use http::HttpError;
pub use json::JsonError;
pub use quota::{QuotaError, QuotaErrorKind};
pub use upstream::{CancelledError, NetworkError, RetryableError, UpstreamError};
