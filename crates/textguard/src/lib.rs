//! TextGuard: a resilient, quota-aware client for LLM-backed text analysis.
//!
//! TextGuard mediates every call to a chat-completions analysis service.
//! It resolves caller credentials to service tiers, enforces each tier's
//! daily quota and batch ceiling, memoizes results, retries transient
//! failures with backoff and fans batches out concurrently.
//!
//! # Crates
//!
//! - `textguard_error`: error taxonomy
//! - `textguard_core`: options, results, fingerprints
//! - `textguard_rate_limit`: tiers and quota
//! - `textguard_cache`: TTL result cache
//! - `textguard_models`: transport and response parsing
//! - `textguard_executor`: retrying executor and batch orchestration
//!
//! This crate composes them behind [`TextGuard`] and loads
//! [`TextGuardConfig`] from layered TOML.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod guard;
mod usage;

pub use config::{CredentialSource, TextGuardConfig};
pub use guard::TextGuard;
pub use usage::UsageReport;

pub use textguard_core::{AnalysisOptions, AnalysisResult};
pub use textguard_error::{TextGuardError, TextGuardErrorKind, TextGuardResult};
pub use textguard_executor::{BatchItem, BatchStatus};
