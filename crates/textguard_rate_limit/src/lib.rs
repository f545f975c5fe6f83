//! Tier resolution and daily quota enforcement.
//!
//! - [`TierRegistry`] maps caller credentials to tiers and tiers to limits.
//! - [`QuotaTracker`] enforces each tier's rolling daily request budget with
//!   an atomic check-and-reserve.
//!
//! Quota is independent of caching and retry: callers reserve before they
//! invoke the executor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod quota;
mod registry;
mod tier;

pub use quota::{QuotaConfig, QuotaState, QuotaTracker, UsageStats};
pub use registry::TierRegistry;
pub use tier::{Tier, TierConfig, TierDefinition};
