//! Tier trait and the concrete tier definition loaded from configuration.

use serde::{Deserialize, Serialize};

/// Service level granted to a caller.
///
/// # Example
///
/// ```
/// use textguard_rate_limit::Tier;
///
/// struct Trial;
///
/// impl Tier for Trial {
///     fn name(&self) -> &str { "trial" }
///     fn requests_per_day(&self) -> u64 { 5 }
///     fn max_batch_size(&self) -> usize { 2 }
/// }
///
/// assert_eq!(Trial.requests_per_day(), 5);
/// ```
pub trait Tier: Send + Sync {
    /// Name of the tier (e.g., "free", "basic", "premium").
    fn name(&self) -> &str;

    /// Daily request budget.
    fn requests_per_day(&self) -> u64;

    /// Largest batch a caller on this tier may submit.
    fn max_batch_size(&self) -> usize;
}

/// Tier limits as written in configuration.
///
/// The tier name is the table key, so it is not repeated here.
///
/// ```toml
/// [tiers.free]
/// requests_per_day = 100
/// max_batch_size = 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Requests per day
    pub requests_per_day: u64,
    /// Maximum batch size
    pub max_batch_size: usize,
}

/// Immutable tier definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TierDefinition {
    /// Tier name
    pub name: String,
    /// Requests per day
    pub requests_per_day: u64,
    /// Maximum batch size
    pub max_batch_size: usize,
}

impl TierDefinition {
    /// Creates a tier definition.
    pub fn new(name: impl Into<String>, requests_per_day: u64, max_batch_size: usize) -> Self {
        Self {
            name: name.into(),
            requests_per_day,
            max_batch_size,
        }
    }

    /// Names a configured tier.
    pub fn from_config(name: impl Into<String>, config: &TierConfig) -> Self {
        Self::new(name, config.requests_per_day, config.max_batch_size)
    }
}

impl Tier for TierDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn requests_per_day(&self) -> u64 {
        self.requests_per_day
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
