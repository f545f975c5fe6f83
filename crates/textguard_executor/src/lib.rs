//! Resilient invocation and batch orchestration for TextGuard.
//!
//! [`ResilientExecutor`] turns one text into one analysis: it checks the
//! result cache, then calls the analysis service through an
//! [`AnalysisTransport`](textguard_models::AnalysisTransport), retrying
//! rate-limit signals and transport failures under a single attempt budget.
//! [`BatchOrchestrator`] fans a batch out over the executor, one task per
//! item, and returns results in input order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use textguard_cache::{ResultCache, ResultCacheConfig};
//! use textguard_core::AnalysisOptions;
//! use textguard_executor::{BatchOrchestrator, ResilientExecutor, RetryConfig};
//! use textguard_models::{HttpTransport, UpstreamConfig};
//!
//! # async fn run() -> textguard_error::TextGuardResult<()> {
//! let upstream = UpstreamConfig::default();
//! let transport = Arc::new(HttpTransport::from_env(&upstream)?);
//! let cache = Arc::new(ResultCache::new(ResultCacheConfig::default()));
//! let executor = ResilientExecutor::new(transport, cache, upstream, RetryConfig::default());
//!
//! let result = executor.invoke("You won a prize!", &AnalysisOptions::default()).await?;
//! println!("spam: {}", result.is_spam());
//!
//! let items = BatchOrchestrator::new(executor)
//!     .run_batch(vec!["hi".into(), "buy now".into()], &AnalysisOptions::default())
//!     .await;
//! assert_eq!(items.len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attempt;
mod batch;
mod config;
mod executor;

pub use attempt::{AttemptOutcome, InvocationReport, RequestAttempt};
pub use batch::{BatchItem, BatchOrchestrator, BatchStatus};
pub use config::{RetryConfig, RetryConfigBuilder};
pub use executor::ResilientExecutor;
