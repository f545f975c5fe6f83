//! Cache-aware remote invocation with bounded retry.

use crate::{AttemptOutcome, InvocationReport, RequestAttempt, RetryConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use textguard_cache::ResultCache;
use textguard_core::{AnalysisOptions, AnalysisResult, ChatPayload, Fingerprint};
use textguard_error::{
    CancelledError, NetworkError, TextGuardError, TextGuardResult, UpstreamError,
};
use textguard_models::{
    AnalysisTransport, ClientMetrics, StatusClass, UpstreamConfig, build_payload,
    classify_status, parse_analysis,
};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, instrument, warn};

/// What to do after one attempt.
enum Step {
    Done(AnalysisResult),
    Retry(Duration),
    Fail(TextGuardError),
}

/// Issues analysis calls, consulting the result cache first.
///
/// Rate-limit signals and transport failures share one attempt budget
/// (`RetryConfig::max_retries`). Any other non-2xx status, and any 2xx body
/// that cannot be parsed, fails immediately. The executor knows nothing
/// about quota; callers reserve before invoking.
///
/// Cloning is cheap: the transport, cache and configuration are shared.
#[derive(Clone)]
pub struct ResilientExecutor {
    transport: Arc<dyn AnalysisTransport>,
    cache: Arc<ResultCache<AnalysisResult>>,
    upstream: Arc<UpstreamConfig>,
    retry: Arc<RetryConfig>,
    tier: Option<String>,
}

impl std::fmt::Debug for ResilientExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientExecutor")
            .field("transport", &self.transport.name())
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .field("tier", &self.tier)
            .finish()
    }
}

impl ResilientExecutor {
    /// Creates an executor.
    pub fn new(
        transport: Arc<dyn AnalysisTransport>,
        cache: Arc<ResultCache<AnalysisResult>>,
        upstream: UpstreamConfig,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            upstream: Arc::new(upstream),
            retry: Arc::new(retry),
            tier: None,
        }
    }

    /// Copy of this executor that labels its payloads with `tier`.
    pub fn for_tier(&self, tier: impl Into<String>) -> Self {
        Self {
            tier: Some(tier.into()),
            ..self.clone()
        }
    }

    /// The shared result cache.
    pub fn cache(&self) -> &Arc<ResultCache<AnalysisResult>> {
        &self.cache
    }

    /// Retry settings.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Upstream settings.
    pub fn upstream_config(&self) -> &UpstreamConfig {
        &self.upstream
    }

    /// Analyses `input`, returning only the result.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError` for rejected or unparseable responses and for
    /// rate limiting that outlasted the retry budget, or `NetworkError` when
    /// transport failures exhausted it.
    pub async fn invoke(
        &self,
        input: &str,
        options: &AnalysisOptions,
    ) -> TextGuardResult<AnalysisResult> {
        self.execute(input, options, &CancellationToken::new())
            .await
            .map(InvocationReport::into_result)
    }

    /// Analyses `input` and reports every attempt made.
    ///
    /// Cancelling `cancel` aborts an in-flight call or backoff sleep.
    ///
    /// # Errors
    ///
    /// As [`invoke`](Self::invoke), plus `CancelledError` when `cancel`
    /// fires first.
    #[instrument(
        skip_all,
        fields(
            tier = self.tier.as_deref().unwrap_or("-"),
            fingerprint = tracing::field::Empty,
            attempts = tracing::field::Empty
        )
    )]
    pub async fn execute(
        &self,
        input: &str,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> TextGuardResult<InvocationReport> {
        let metrics = ClientMetrics::get();

        if cancel.is_cancelled() {
            return Err(self.fail(CancelledError::new("Cancelled before the call started").into()));
        }

        let fingerprint = Fingerprint::compute(input, options)?;
        Span::current().record("fingerprint", fingerprint.as_str());

        if let Some(result) = self.cache.lookup(&fingerprint) {
            metrics.record_cache(true);
            debug!("Cache hit, skipping remote call");
            return Ok(InvocationReport::cached(result));
        }
        metrics.record_cache(false);

        let payload = build_payload(input, options, &self.upstream, self.tier.as_deref());
        let max_attempts = self.retry.max_attempts();
        let mut attempts = Vec::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            Span::current().record("attempts", attempt);

            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(attempt, "Cancelled during remote call");
                    return Err(self.fail(CancelledError::new("Cancelled during remote call").into()));
                }
                step = self.attempt(input, &payload, attempt, max_attempts) => step,
            };

            let delay = match step {
                Step::Done(result) => {
                    attempts.push(RequestAttempt::new(attempt, AttemptOutcome::Success));
                    self.cache.store(fingerprint, result.clone());
                    info!(attempt, is_spam = result.is_spam(), "Analysis complete");
                    return Ok(InvocationReport::fetched(result, attempts));
                }
                Step::Fail(error) => return Err(self.fail(error)),
                Step::Retry(delay) => delay,
            };

            attempts.push(
                RequestAttempt::new(attempt, AttemptOutcome::RetryableFailure).with_backoff(delay),
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(attempt, "Cancelled during backoff");
                    return Err(self.fail(CancelledError::new("Cancelled during backoff").into()));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One remote call, classified.
    async fn attempt(
        &self,
        input: &str,
        payload: &ChatPayload,
        attempt: u32,
        max_attempts: u32,
    ) -> Step {
        let metrics = ClientMetrics::get();
        let started = Instant::now();
        let outcome = self.transport.call(payload).await;
        let elapsed = started.elapsed().as_secs_f64();
        let exhausted = attempt >= max_attempts;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                metrics.record_request(&payload.model, None, elapsed);
                if exhausted {
                    warn!(attempt, error = %e, "Transport failed, retries exhausted");
                    return Step::Fail(NetworkError::new(e.message, attempt).into());
                }
                let delay = self.retry.backoff_delay(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transport failed, backing off"
                );
                metrics.record_retry("transport");
                return Step::Retry(delay);
            }
        };

        metrics.record_request(&payload.model, Some(response.status), elapsed);

        match classify_status(response.status) {
            StatusClass::Success => match parse_analysis(input, &response.body) {
                Ok(result) => Step::Done(result),
                Err(e) => {
                    warn!(attempt, error = %e, "Unparseable success response");
                    Step::Fail(UpstreamError::new(None, false, e.to_string(), attempt).into())
                }
            },
            StatusClass::RateLimited if exhausted => {
                warn!(attempt, "Rate limited, retries exhausted");
                Step::Fail(
                    UpstreamError::new(Some(response.status), true, response.body, attempt).into(),
                )
            }
            StatusClass::RateLimited => {
                let delay = self.retry.rate_limit_delay(response.retry_after);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, pausing"
                );
                metrics.record_retry("rate_limited");
                Step::Retry(delay)
            }
            StatusClass::Fatal => {
                warn!(attempt, status = response.status, "Request rejected");
                Step::Fail(
                    UpstreamError::new(Some(response.status), false, response.body, attempt)
                        .into(),
                )
            }
        }
    }

    fn fail(&self, error: TextGuardError) -> TextGuardError {
        ClientMetrics::get().record_error(&error);
        error
    }
}
