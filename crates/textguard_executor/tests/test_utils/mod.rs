//! Test utilities for executor tests.
//!
//! Provides a scripted transport that never touches the network.

#![allow(dead_code)]

pub mod mock_transport;

pub use mock_transport::{MockReply, MockTransport, completion};

use std::sync::Arc;
use textguard_cache::{ResultCache, ResultCacheConfig};
use textguard_executor::{ResilientExecutor, RetryConfig};
use textguard_models::UpstreamConfig;

/// Executor over `transport` with default cache and retry settings.
pub fn executor_with(transport: Arc<MockTransport>) -> ResilientExecutor {
    executor_with_config(transport, ResultCacheConfig::default(), RetryConfig::default())
}

/// Executor over `transport` with explicit cache and retry settings.
pub fn executor_with_config(
    transport: Arc<MockTransport>,
    cache: ResultCacheConfig,
    retry: RetryConfig,
) -> ResilientExecutor {
    ResilientExecutor::new(
        transport,
        Arc::new(ResultCache::new(cache)),
        UpstreamConfig::default(),
        retry,
    )
}
