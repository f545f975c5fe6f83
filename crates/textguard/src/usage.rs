//! Usage reporting.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use textguard_cache::CacheStats;
use textguard_rate_limit::UsageStats;

/// Quota and cache statistics for one caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct UsageReport {
    /// Caller's tier
    tier: String,
    /// Requests reserved in the current window
    requests_today: u64,
    /// Requests left in the current window
    requests_remaining: u64,
    /// When the window resets
    reset_time: DateTime<Utc>,
    /// Entries in the shared result cache
    cache_size: usize,
    /// Cache hits since startup
    cache_hits: u64,
    /// Cache misses since startup
    cache_misses: u64,
    /// When the report was taken
    timestamp: DateTime<Utc>,
}

impl UsageReport {
    pub(crate) fn new(quota: &UsageStats, cache: &CacheStats, timestamp: DateTime<Utc>) -> Self {
        Self {
            tier: quota.tier().clone(),
            requests_today: *quota.requests_today(),
            requests_remaining: *quota.requests_remaining(),
            reset_time: *quota.reset_time(),
            cache_size: *cache.size(),
            cache_hits: *cache.hits(),
            cache_misses: *cache.misses(),
            timestamp,
        }
    }
}
