//! The caller-facing composition of registry, quota, cache and executor.

use crate::{TextGuardConfig, UsageReport};
use std::sync::Arc;
use textguard_cache::ResultCache;
use textguard_core::{AnalysisOptions, AnalysisResult, Clock, SystemClock};
use textguard_error::{QuotaError, QuotaErrorKind, TextGuardResult};
use textguard_executor::{BatchItem, BatchOrchestrator, ResilientExecutor};
use textguard_models::{AnalysisTransport, HttpTransport};
use textguard_rate_limit::{QuotaTracker, TierDefinition, TierRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, instrument, warn};

/// Quota-aware analysis client.
///
/// Every call resolves the credential to a tier, enforces that tier's batch
/// ceiling and daily quota, and only then reaches the executor. Rejections
/// happen before any remote call is made. Cloning shares all state.
///
/// # Example
///
/// ```no_run
/// use textguard::{TextGuard, TextGuardConfig};
/// use textguard_core::AnalysisOptions;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TextGuardConfig::load()?;
/// let guard = TextGuard::connect(&config)?;
///
/// let key = std::env::var("FREE_API_KEY")?;
/// let result = guard
///     .analyze(&key, "Congratulations, you won!", &AnalysisOptions::default())
///     .await?;
/// println!("spam: {} ({:.0}%)", result.is_spam(), result.confidence() * 100.0);
///
/// let usage = guard.usage(&key)?;
/// println!("{} requests left today", usage.requests_remaining());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TextGuard {
    registry: Arc<TierRegistry>,
    quota: Arc<QuotaTracker>,
    executor: ResilientExecutor,
    clock: Arc<dyn Clock>,
}

impl TextGuard {
    /// Assembles a client from its parts.
    pub fn new(
        registry: Arc<TierRegistry>,
        quota: Arc<QuotaTracker>,
        executor: ResilientExecutor,
    ) -> Self {
        Self {
            registry,
            quota,
            executor,
            clock: Arc::new(SystemClock),
        }
    }

    /// Builds a client that talks to the configured service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service API key is unset or a
    /// credential names an unknown tier.
    pub fn connect(config: &TextGuardConfig) -> TextGuardResult<Self> {
        let transport = Arc::new(HttpTransport::from_env(config.upstream())?);
        Self::from_config(config, transport)
    }

    /// Builds a client over `transport`, reading credentials from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential names an unknown tier.
    pub fn from_config(
        config: &TextGuardConfig,
        transport: Arc<dyn AnalysisTransport>,
    ) -> TextGuardResult<Self> {
        Self::from_config_with(
            config,
            transport,
            |variable| std::env::var(variable).ok(),
            Arc::new(SystemClock),
        )
    }

    /// Builds a client with explicit credential lookup and clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential names an unknown tier.
    #[instrument(skip_all, fields(transport = transport.name()))]
    pub fn from_config_with<F>(
        config: &TextGuardConfig,
        transport: Arc<dyn AnalysisTransport>,
        lookup: F,
        clock: Arc<dyn Clock>,
    ) -> TextGuardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry = Arc::new(TierRegistry::from_config(
            config.tiers(),
            &config.credential_map(),
            lookup,
        )?);
        let quota = Arc::new(QuotaTracker::with_clock(
            registry.clone(),
            config.quota().clone(),
            clock.clone(),
        ));
        let cache = Arc::new(ResultCache::new(config.cache().clone()));
        let executor = ResilientExecutor::new(
            transport,
            cache,
            config.upstream().clone(),
            config.retry().clone(),
        );

        info!(tiers = ?registry.tiers(), "TextGuard ready");
        Ok(Self {
            registry,
            quota,
            executor,
            clock,
        })
    }

    /// Analyses one text for the caller identified by `credential`.
    ///
    /// Consumes one unit of the tier's daily quota, even when the result is
    /// served from cache.
    ///
    /// # Errors
    ///
    /// Returns an auth error for an empty or unknown credential, a quota
    /// error when the tier's budget is spent, or whatever the executor
    /// reports.
    #[instrument(skip_all, fields(tier = tracing::field::Empty))]
    pub async fn analyze(
        &self,
        credential: &str,
        text: &str,
        options: &AnalysisOptions,
    ) -> TextGuardResult<AnalysisResult> {
        let tier = self.registry.resolve(credential)?;
        Span::current().record("tier", tier.as_str());

        self.reserve(&tier, 1)?;
        self.executor.for_tier(&tier).invoke(text, options).await
    }

    /// Analyses a batch, one result slot per text in input order.
    ///
    /// # Errors
    ///
    /// Returns an auth error for an empty or unknown credential, a quota
    /// error when the batch exceeds the tier's ceiling or remaining budget.
    /// Failures of individual items are reported in their slots.
    pub async fn analyze_batch(
        &self,
        credential: &str,
        texts: Vec<String>,
        options: &AnalysisOptions,
    ) -> TextGuardResult<Vec<BatchItem>> {
        self.analyze_batch_with_cancel(credential, texts, options, &CancellationToken::new())
            .await
    }

    /// As [`analyze_batch`](Self::analyze_batch), stopping unfinished items
    /// when `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`analyze_batch`](Self::analyze_batch).
    #[instrument(skip_all, fields(tier = tracing::field::Empty, batch_size = texts.len()))]
    pub async fn analyze_batch_with_cancel(
        &self,
        credential: &str,
        texts: Vec<String>,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> TextGuardResult<Vec<BatchItem>> {
        let tier = self.registry.resolve(credential)?;
        Span::current().record("tier", tier.as_str());

        if texts.is_empty() {
            debug!("Empty batch, nothing to do");
            return Ok(Vec::new());
        }

        let max = self.registry.limits(&tier)?.max_batch_size;
        if texts.len() > max {
            warn!(max, "Batch exceeds tier ceiling");
            return Err(QuotaError::new(QuotaErrorKind::BatchTooLarge {
                tier,
                requested: texts.len(),
                max,
            })
            .into());
        }

        self.reserve(&tier, texts.len() as u64)?;
        let items = BatchOrchestrator::new(self.executor.for_tier(&tier))
            .run_batch_with_cancel(texts, options, cancel)
            .await;
        Ok(items)
    }

    /// Usage and cache statistics for the caller's tier.
    ///
    /// # Errors
    ///
    /// Returns an auth error for an empty or unknown credential.
    pub fn usage(&self, credential: &str) -> TextGuardResult<UsageReport> {
        let tier = self.registry.resolve(credential)?;
        let stats = self.quota.stats(&tier)?;
        let cache = self.executor.cache().stats();
        Ok(UsageReport::new(&stats, &cache, self.clock.now()))
    }

    /// Known tiers, sorted by name.
    pub fn tiers(&self) -> Vec<TierDefinition> {
        self.registry
            .tiers()
            .into_iter()
            .filter_map(|name| self.registry.limits(name).ok().cloned())
            .collect()
    }

    /// The underlying executor.
    pub fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    /// The quota tracker.
    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Reserves `units` of `tier`'s quota or explains why not.
    fn reserve(&self, tier: &str, units: u64) -> TextGuardResult<()> {
        if self.quota.check_and_reserve_many(tier, units)? {
            return Ok(());
        }

        let limit = self.registry.limits(tier)?.requests_per_day;
        let stats = self.quota.stats(tier)?;
        warn!(
            limit,
            requested = units,
            remaining = stats.requests_remaining(),
            "Quota exhausted"
        );
        Err(QuotaError::new(QuotaErrorKind::Exceeded {
            tier: tier.to_string(),
            limit,
            requested: units,
            reset_time: stats.reset_time().to_rfc3339(),
        })
        .into())
    }
}
