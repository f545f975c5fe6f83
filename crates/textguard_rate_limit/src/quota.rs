//! Rolling daily request budgets per tier.

use crate::{Tier, TierRegistry};
use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use textguard_core::{Clock, SystemClock};
use textguard_error::TextGuardResult;
use tracing::{debug, info, instrument};

fn default_window_secs() -> u64 {
    86_400
}

/// Quota window configuration.
///
/// ```toml
/// [quota]
/// window_secs = 86400
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct QuotaConfig {
    /// Length of the quota window in seconds (default 24 hours)
    #[serde(default = "default_window_secs")]
    window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

/// Usage counter for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QuotaState {
    tier: String,
    count: u64,
    window_reset_at: DateTime<Utc>,
}

impl QuotaState {
    fn fresh(tier: &str, now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            tier: tier.to_string(),
            count: 0,
            window_reset_at: window_end(now, window),
        }
    }
}

/// End of a window opened at `now`, saturating at the latest representable
/// instant.
fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_add_signed(window)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Read-only usage snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct UsageStats {
    /// Tier name
    tier: String,
    /// Requests reserved in the current window
    requests_today: u64,
    /// Requests still available in the current window
    requests_remaining: u64,
    /// When the current window ends
    reset_time: DateTime<Utc>,
}

/// Enforces each tier's daily request budget.
///
/// All state sits behind one mutex, and every reservation is a single
/// critical section that resets an expired window, compares against the
/// limit and increments. Concurrent batch items therefore can never push a
/// tier past its limit. The lock is never held across an await.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use textguard_rate_limit::{QuotaConfig, QuotaTracker, TierDefinition, TierRegistry};
///
/// let registry = Arc::new(TierRegistry::new([TierDefinition::new("free", 2, 10)]));
/// let quota = QuotaTracker::new(registry, QuotaConfig::default());
///
/// assert!(quota.check_and_reserve("free").unwrap());
/// assert!(quota.check_and_reserve("free").unwrap());
/// assert!(!quota.check_and_reserve("free").unwrap());
/// assert_eq!(*quota.stats("free").unwrap().requests_remaining(), 0);
/// ```
#[derive(Debug)]
pub struct QuotaTracker {
    registry: Arc<TierRegistry>,
    window: Duration,
    clock: Arc<dyn Clock>,
    states: Mutex<HashMap<String, QuotaState>>,
}

impl QuotaTracker {
    /// Creates a tracker using the system clock.
    pub fn new(registry: Arc<TierRegistry>, config: QuotaConfig) -> Self {
        Self::with_clock(registry, config, Arc::new(SystemClock))
    }

    /// Creates a tracker with an explicit clock.
    pub fn with_clock(registry: Arc<TierRegistry>, config: QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let window = i64::try_from(config.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        debug!(window_secs = window.num_seconds(), "Creating QuotaTracker");
        Self {
            registry,
            window,
            clock,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Atomically reserves one request for `tier`.
    ///
    /// Returns `false` without touching the count when the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier is unknown.
    pub fn check_and_reserve(&self, tier: &str) -> TextGuardResult<bool> {
        self.check_and_reserve_many(tier, 1)
    }

    /// Atomically reserves `units` requests, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier is unknown.
    #[instrument(skip(self), fields(limit = tracing::field::Empty))]
    pub fn check_and_reserve_many(&self, tier: &str, units: u64) -> TextGuardResult<bool> {
        let limit = self.registry.limits(tier)?.requests_per_day();
        tracing::Span::current().record("limit", limit);
        let now = self.clock.now();

        let mut states = self.states.lock();
        let state = self.current_state(&mut states, tier, now);

        if state.count.saturating_add(units) > limit {
            debug!(count = state.count, "Quota exhausted, reservation rejected");
            return Ok(false);
        }

        state.count += units;
        debug!(count = state.count, "Reserved quota");
        Ok(true)
    }

    /// Usage snapshot for `tier`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the tier is unknown.
    pub fn stats(&self, tier: &str) -> TextGuardResult<UsageStats> {
        let limit = self.registry.limits(tier)?.requests_per_day();
        let now = self.clock.now();

        let states = self.states.lock();
        let (count, reset_time) = match states.get(tier) {
            Some(state) if now <= state.window_reset_at => (state.count, state.window_reset_at),
            _ => (0, window_end(now, self.window)),
        };

        Ok(UsageStats {
            tier: tier.to_string(),
            requests_today: count,
            requests_remaining: limit.saturating_sub(count),
            reset_time,
        })
    }

    /// Copy of the raw state for `tier`, if it has been touched.
    pub fn state(&self, tier: &str) -> Option<QuotaState> {
        self.states.lock().get(tier).cloned()
    }

    /// Returns the tier's state after resetting it if its window has passed.
    fn current_state<'a>(
        &self,
        states: &'a mut HashMap<String, QuotaState>,
        tier: &str,
        now: DateTime<Utc>,
    ) -> &'a mut QuotaState {
        let state = states
            .entry(tier.to_string())
            .or_insert_with(|| QuotaState::fresh(tier, now, self.window));

        if now > state.window_reset_at {
            info!(tier, previous = state.count, "Quota window elapsed, resetting");
            *state = QuotaState::fresh(tier, now, self.window);
        }

        state
    }
}
