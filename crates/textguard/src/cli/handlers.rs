//! Command handlers.

use std::path::Path;
use std::time::Duration;
use textguard::{AnalysisOptions, TextGuard, TextGuardConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Analyze one text and print the result as JSON.
pub async fn analyze(
    guard: &TextGuard,
    key: &str,
    text: &str,
    options: &AnalysisOptions,
) -> CliResult {
    let result = guard.analyze(key, text, options).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Analyze each non-empty line of `file`, printing one JSON object per item.
///
/// Ctrl-C or the deadline cancels items still in flight; finished items are
/// still printed.
pub async fn batch(
    guard: &TextGuard,
    key: &str,
    file: &Path,
    deadline: Option<Duration>,
) -> CliResult {
    let contents = tokio::fs::read_to_string(file).await?;
    let texts: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    info!(file = %file.display(), items = texts.len(), "Submitting batch");

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let expired = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep(deadline).await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => warn!("Interrupted, cancelling batch"),
                _ = expired => warn!("Deadline reached, cancelling batch"),
            }
            cancel.cancel();
        })
    };

    let items = guard
        .analyze_batch_with_cancel(key, texts, &AnalysisOptions::default(), &cancel)
        .await;
    watcher.abort();

    for item in items? {
        println!("{}", serde_json::to_string(&item)?);
    }
    Ok(())
}

/// Print quota and cache usage as JSON.
pub fn usage(guard: &TextGuard, key: &str) -> CliResult {
    let report = guard.usage(key)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print the configured tiers.
pub fn list_tiers(config: &TextGuardConfig) -> CliResult {
    let mut tiers: Vec<_> = config.tiers().iter().collect();
    tiers.sort_by(|a, b| a.0.cmp(b.0));

    println!("{:<12} {:>16} {:>14}", "TIER", "REQUESTS/DAY", "MAX BATCH");
    for (name, tier) in tiers {
        println!(
            "{:<12} {:>16} {:>14}",
            name, tier.requests_per_day, tier.max_batch_size
        );
    }
    Ok(())
}
