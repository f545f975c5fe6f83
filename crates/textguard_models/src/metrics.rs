//! Metrics for analysis calls.
//!
//! Provides OpenTelemetry-based counters for remote requests, retries,
//! failures and cache effectiveness. Instruments are no-ops until the host
//! process installs a meter provider.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;
use textguard_error::{TextGuardError, TextGuardErrorKind};

static METRICS: OnceLock<ClientMetrics> = OnceLock::new();

/// Metrics for analysis client interactions.
#[derive(Clone)]
pub struct ClientMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Remote calls issued
    pub requests: Counter<u64>,
    /// Invocations that ended in an error
    pub errors: Counter<u64>,
    /// Attempts beyond the first
    pub retries: Counter<u64>,
    /// Lookups answered from the cache
    pub cache_hits: Counter<u64>,
    /// Lookups that went to the network
    pub cache_misses: Counter<u64>,
    /// Remote call duration in seconds
    pub duration: Histogram<f64>,
}

impl ClientMetrics {
    fn init() -> Self {
        let meter = global::meter("textguard");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("textguard.requests")
                .with_description("Remote analysis calls issued")
                .build(),
            errors: meter
                .u64_counter("textguard.errors")
                .with_description("Failed analysis invocations")
                .build(),
            retries: meter
                .u64_counter("textguard.retries")
                .with_description("Retried remote calls")
                .build(),
            cache_hits: meter
                .u64_counter("textguard.cache.hits")
                .with_description("Invocations answered from the result cache")
                .build(),
            cache_misses: meter
                .u64_counter("textguard.cache.misses")
                .with_description("Invocations that required a remote call")
                .build(),
            duration: meter
                .f64_histogram("textguard.duration")
                .with_unit("s")
                .with_description("Remote call duration")
                .build(),
        }
    }

    /// Get the global metrics instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record one remote call and how long it took.
    pub fn record_request(&self, model: &str, status: Option<u16>, duration_secs: f64) {
        let labels = &[
            KeyValue::new("model", model.to_string()),
            KeyValue::new(
                "status",
                status.map(i64::from).unwrap_or(0),
            ),
        ];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a retry and its cause.
    pub fn record_retry(&self, cause: &'static str) {
        self.retries.add(1, &[KeyValue::new("cause", cause)]);
    }

    /// Record a failed invocation.
    pub fn record_error(&self, error: &TextGuardError) {
        self.errors
            .add(1, &[KeyValue::new("error_type", classify_error(error))]);
    }

    /// Record a cache lookup outcome.
    pub fn record_cache(&self, hit: bool) {
        if hit {
            self.cache_hits.add(1, &[]);
        } else {
            self.cache_misses.add(1, &[]);
        }
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}

/// Classify an error for metrics labeling.
///
/// Returns one of: "auth", "quota", "network", "upstream", "cancelled",
/// "batch", "config", "json".
pub fn classify_error(error: &TextGuardError) -> &'static str {
    match error.kind() {
        TextGuardErrorKind::Auth(_) => "auth",
        TextGuardErrorKind::Quota(_) => "quota",
        TextGuardErrorKind::Network(_) | TextGuardErrorKind::Http(_) => "network",
        TextGuardErrorKind::Upstream(_) => "upstream",
        TextGuardErrorKind::Cancelled(_) => "cancelled",
        TextGuardErrorKind::Batch(_) => "batch",
        TextGuardErrorKind::Config(_) => "config",
        TextGuardErrorKind::Json(_) => "json",
    }
}
