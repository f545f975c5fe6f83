//! Test utilities for facade tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use textguard::{CredentialSource, TextGuard, TextGuardConfig};
use textguard_core::{ChatPayload, Clock};
use textguard_error::HttpError;
use textguard_models::{AnalysisTransport, TransportResponse};
use textguard_rate_limit::TierConfig;

pub const FREE_KEY: &str = "free-key-123";
pub const PREMIUM_KEY: &str = "premium-key-456";

/// Transport that always answers with the same analysis.
pub struct CountingTransport {
    analysis: String,
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn new(analysis: &str) -> Self {
        Self {
            analysis: analysis.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisTransport for CountingTransport {
    async fn call(&self, _payload: &ChatPayload) -> Result<TransportResponse, HttpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": self.analysis}}]
        });
        Ok(TransportResponse::new(200, body.to_string()))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Two tiers: free (3/day, batches of 2) and premium (100/day, batches of 10).
pub fn test_config() -> TextGuardConfig {
    TextGuardConfig::default()
        .with_tier(
            "free",
            TierConfig {
                requests_per_day: 3,
                max_batch_size: 2,
            },
        )
        .with_tier(
            "premium",
            TierConfig {
                requests_per_day: 100,
                max_batch_size: 10,
            },
        )
        .with_credential(CredentialSource::new("TEST_FREE_KEY", "free"))
        .with_credential(CredentialSource::new("TEST_PREMIUM_KEY", "premium"))
        .with_credential(CredentialSource::new("TEST_UNSET_KEY", "premium"))
}

/// Facade over `transport` with the test credentials and `clock`.
pub fn guard_with(transport: Arc<CountingTransport>, clock: Arc<dyn Clock>) -> TextGuard {
    let env = HashMap::from([
        ("TEST_FREE_KEY", FREE_KEY),
        ("TEST_PREMIUM_KEY", PREMIUM_KEY),
    ]);
    TextGuard::from_config_with(
        &test_config(),
        transport,
        |variable| env.get(variable).map(|value| value.to_string()),
        clock,
    )
    .expect("test configuration is valid")
}
