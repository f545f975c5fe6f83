//! Result caching with TTL support.
//!
//! This crate memoizes completed analysis results by request fingerprint so
//! repeated identical requests never re-incur network cost or retry delay.

#![warn(missing_docs)]

mod cache;

pub use cache::{
    CacheEntry, CacheStats, ResultCache, ResultCacheConfig, ResultCacheConfigBuilder,
};
