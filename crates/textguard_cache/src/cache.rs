//! Fingerprint-keyed result cache implementation.

use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use textguard_core::Fingerprint;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Cache entry with value and storage time.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry<V> {
    fingerprint: Fingerprint,
    value: V,
    stored_at: Instant,
    #[getter(skip)]
    sequence: u64,
}

impl<V> CacheEntry<V> {
    /// Whether this entry is past `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }

    /// Time left before the entry expires under `ttl`.
    pub fn time_remaining(&self, ttl: Duration) -> Option<Duration> {
        ttl.checked_sub(self.stored_at.elapsed())
    }
}

/// Configuration for the result cache.
///
/// ```toml
/// [cache]
/// ttl_secs = 3600
/// max_entries = 1000
/// enabled = true
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct ResultCacheConfig {
    /// Time-to-live for cached results (seconds)
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,

    /// Maximum number of entries before the oldest is evicted
    #[serde(default = "default_max_entries")]
    max_entries: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    1000
}

fn default_enabled() -> bool {
    true
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            enabled: default_enabled(),
        }
    }
}

impl ResultCacheConfig {
    /// TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet purged
    size: usize,
    /// Lookups answered from the cache
    hits: u64,
    /// Lookups that found nothing usable
    misses: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<Fingerprint, CacheEntry<V>>,
    // Storage order, oldest first, keyed by entry sequence number.
    order: BTreeMap<u64, Fingerprint>,
    next_sequence: u64,
    hits: u64,
    misses: u64,
}

impl<V> CacheState<V> {
    fn remove(&mut self, fingerprint: &Fingerprint) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(fingerprint)?;
        self.order.remove(&entry.sequence);
        Some(entry)
    }
}

/// Memoizes completed analysis results by request fingerprint.
///
/// Expired entries are never returned, whether or not they have been
/// physically removed yet. Expired entries are purged lazily on lookup and
/// on insert when the cache is full; once full, the least recently stored
/// entry is evicted. A single mutex guards the map, so readers never observe
/// a partially written entry, and the lock is never held across an await.
///
/// # Example
///
/// ```
/// use textguard_cache::{ResultCache, ResultCacheConfig};
/// use textguard_core::{AnalysisOptions, Fingerprint};
///
/// let cache = ResultCache::new(ResultCacheConfig::default());
/// let key = Fingerprint::compute("hello", &AnalysisOptions::default()).unwrap();
///
/// assert!(cache.lookup(&key).is_none());
/// cache.store(key.clone(), "not spam".to_string());
/// assert_eq!(cache.lookup(&key).as_deref(), Some("not spam"));
/// ```
#[derive(Debug)]
pub struct ResultCache<V> {
    config: ResultCacheConfig,
    state: Mutex<CacheState<V>>,
}

impl<V: Clone> ResultCache<V> {
    /// Create a new result cache with configuration.
    pub fn new(config: ResultCacheConfig) -> Self {
        debug!(
            ttl_secs = config.ttl_secs,
            max_entries = config.max_entries,
            enabled = config.enabled,
            "Creating new ResultCache"
        );
        Self {
            config,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                next_sequence: 0,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &ResultCacheConfig {
        &self.config
    }

    /// Returns the cached value if present and younger than the TTL.
    #[instrument(skip_all, fields(fingerprint = %fingerprint))]
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<V> {
        let ttl = self.config.ttl();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !self.config.enabled {
            state.misses += 1;
            return None;
        }

        match state.entries.get(fingerprint).map(|entry| entry.is_expired(ttl)) {
            None => {
                debug!("Cache miss");
                state.misses += 1;
                None
            }
            Some(true) => {
                debug!("Cache entry expired, removing");
                state.remove(fingerprint);
                state.misses += 1;
                None
            }
            Some(false) => {
                state.hits += 1;
                let entry = state.entries.get(fingerprint)?;
                debug!(time_remaining = ?entry.time_remaining(ttl), "Cache hit");
                Some(entry.value.clone())
            }
        }
    }

    /// Stores a value, replacing any previous entry for the fingerprint.
    #[instrument(skip_all, fields(fingerprint = %fingerprint))]
    pub fn store(&self, fingerprint: Fingerprint, value: V) {
        if !self.config.enabled {
            debug!("Cache disabled, not storing");
            return;
        }

        let ttl = self.config.ttl();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.remove(&fingerprint);

        if state.entries.len() >= self.config.max_entries {
            Self::purge_locked(state, ttl);
        }

        while !state.entries.is_empty() && state.entries.len() >= self.config.max_entries {
            let Some((_, oldest)) = state.order.pop_first() else {
                break;
            };
            debug!(fingerprint = %oldest, "Evicting least recently stored entry");
            state.entries.remove(&oldest);
        }

        if self.config.max_entries == 0 {
            return;
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.order.insert(sequence, fingerprint.clone());
        state.entries.insert(
            fingerprint.clone(),
            CacheEntry {
                fingerprint,
                value,
                stored_at: Instant::now(),
                sequence,
            },
        );
        debug!(cache_size = state.entries.len(), "Stored result");
    }

    /// Remove expired entries from cache.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.config.ttl();
        let mut state = self.state.lock();
        let removed = Self::purge_locked(&mut state, ttl);
        if removed > 0 {
            info!(
                removed,
                remaining = state.entries.len(),
                "Cleaned up expired cache entries"
            );
        }
        removed
    }

    /// Clear all cache entries.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let count = state.entries.len();
        state.entries.clear();
        state.order.clear();
        info!(cleared = count, "Cleared cache");
    }

    /// Get number of stored entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Hit/miss counters and size.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            size: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }

    fn purge_locked(state: &mut CacheState<V>, ttl: Duration) -> usize {
        let expired: Vec<Fingerprint> = state
            .entries
            .values()
            .filter(|entry| entry.is_expired(ttl))
            .map(|entry| entry.fingerprint.clone())
            .collect();
        for fingerprint in &expired {
            state.remove(fingerprint);
        }
        expired.len()
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(ResultCacheConfig::default())
    }
}
