//! Concurrent batch fan-out with positional results.

use crate::ResilientExecutor;
use derive_getters::Getters;
use futures::future::join_all;
use serde::{Serialize, Serializer};
use std::time::Duration;
use textguard_core::{AnalysisOptions, AnalysisResult};
use textguard_error::{BatchError, TextGuardError, TextGuardErrorKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of one batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Not yet finished
    #[display("pending")]
    Pending,
    /// Analysis succeeded
    #[display("success")]
    Success,
    /// Analysis failed; the error is kept in the slot
    #[display("error")]
    Error,
    /// The batch was cancelled before this item finished
    #[display("cancelled")]
    Cancelled,
}

/// One input's slot in a batch.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct BatchItem {
    /// Position in the submitted batch
    index: usize,
    /// Text as submitted
    input: String,
    /// Current status
    status: BatchStatus,
    /// Analysis, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisResult>,
    /// Failure, on error or cancellation
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    error: Option<TextGuardError>,
}

fn serialize_error<S>(error: &Option<TextGuardError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(error) => serializer.serialize_str(&error.kind().to_string()),
        None => serializer.serialize_none(),
    }
}

impl BatchItem {
    fn pending(index: usize, input: String) -> Self {
        Self {
            index,
            input,
            status: BatchStatus::Pending,
            result: None,
            error: None,
        }
    }

    fn settle(&mut self, outcome: Result<AnalysisResult, TextGuardError>) {
        match outcome {
            Ok(result) => {
                self.status = BatchStatus::Success;
                self.result = Some(result);
            }
            Err(error) => {
                self.status = match error.kind() {
                    TextGuardErrorKind::Cancelled(_) => BatchStatus::Cancelled,
                    _ => BatchStatus::Error,
                };
                self.error = Some(error);
            }
        }
    }

    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Success
    }
}

/// Runs one executor invocation per input, concurrently.
///
/// Each item runs in its own spawned task and writes only its own slot.
/// Results come back in input order, one failure never stops the others,
/// and a panicking task yields an error slot rather than aborting the
/// batch. The per-tier batch ceiling is the caller's concern.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    executor: ResilientExecutor,
}

impl BatchOrchestrator {
    /// Creates an orchestrator over `executor`.
    pub fn new(executor: ResilientExecutor) -> Self {
        Self { executor }
    }

    /// The executor each item is dispatched to.
    pub fn executor(&self) -> &ResilientExecutor {
        &self.executor
    }

    /// Analyses every input, returning one item per input in order.
    pub async fn run_batch(
        &self,
        inputs: Vec<String>,
        options: &AnalysisOptions,
    ) -> Vec<BatchItem> {
        self.run_batch_with_cancel(inputs, options, &CancellationToken::new())
            .await
    }

    /// As [`run_batch`](Self::run_batch), cancelling whatever is still
    /// running once `deadline` elapses.
    pub async fn run_batch_with_deadline(
        &self,
        inputs: Vec<String>,
        options: &AnalysisOptions,
        deadline: Duration,
    ) -> Vec<BatchItem> {
        let cancel = CancellationToken::new();
        let timer = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                debug!(deadline_ms = deadline.as_millis() as u64, "Batch deadline reached");
                cancel.cancel();
            })
        };

        let items = self.run_batch_with_cancel(inputs, options, &cancel).await;
        timer.abort();
        items
    }

    /// As [`run_batch`](Self::run_batch), stopping unfinished items when
    /// `cancel` fires or this future is dropped. Stopped items report
    /// [`BatchStatus::Cancelled`].
    #[instrument(skip_all, fields(batch_size = inputs.len()))]
    pub async fn run_batch_with_cancel(
        &self,
        inputs: Vec<String>,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Vec<BatchItem> {
        // Dropping this future cancels every item still in flight.
        let batch_cancel = cancel.child_token();
        let _guard = batch_cancel.clone().drop_guard();

        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let executor = self.executor.clone();
                let input = input.clone();
                let options = options.clone();
                let cancel = batch_cancel.child_token();
                tokio::spawn(async move {
                    executor
                        .execute(&input, &options, &cancel)
                        .await
                        .map(|report| report.into_result())
                })
            })
            .collect();

        let mut items: Vec<BatchItem> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| BatchItem::pending(index, input))
            .collect();

        for (slot, joined) in items.iter_mut().zip(join_all(handles).await) {
            let outcome = joined.unwrap_or_else(|e| {
                warn!(index = slot.index, error = %e, "Batch task failed");
                let message = if e.is_panic() { "panicked" } else { "was aborted" };
                Err(BatchError::new(slot.index, message).into())
            });
            slot.settle(outcome);
        }

        let succeeded = items.iter().filter(|item| item.is_success()).count();
        info!(
            succeeded,
            failed = items.len() - succeeded,
            "Batch complete"
        );
        items
    }
}
