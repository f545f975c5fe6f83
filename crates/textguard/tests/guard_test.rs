//! Credential, quota and batch-ceiling enforcement at the facade.

mod test_utils;

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use test_utils::{CountingTransport, FREE_KEY, PREMIUM_KEY, guard_with};
use textguard::{AnalysisOptions, BatchStatus, TextGuardErrorKind};
use textguard_core::{ManualClock, SystemClock};
use textguard_error::{AuthErrorKind, QuotaErrorKind};

fn texts(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("message number {}", i)).collect()
}

#[tokio::test]
async fn test_analyze_resolves_tier_and_counts_usage() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("This is spam. 90% confidence."));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));

    let result = guard
        .analyze(FREE_KEY, "Cheap pills", &AnalysisOptions::default())
        .await?;

    assert!(result.is_spam());
    assert_eq!(*result.confidence(), 0.9);
    assert_eq!(transport.call_count(), 1);

    let usage = guard.usage(FREE_KEY)?;
    assert_eq!(usage.tier(), "free");
    assert_eq!(*usage.requests_today(), 1);
    assert_eq!(*usage.requests_remaining(), 2);
    assert_eq!(*usage.cache_size(), 1);
    assert_eq!(*usage.cache_misses(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_and_missing_credentials_are_rejected() {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));
    let options = AnalysisOptions::default();

    let unknown = guard.analyze("stolen-key", "hi", &options).await.unwrap_err();
    match unknown.kind() {
        TextGuardErrorKind::Auth(e) => assert_eq!(e.kind, AuthErrorKind::UnknownCredential),
        other => panic!("expected auth error, got {:?}", other),
    }
    assert_eq!(unknown.kind().status_hint(), 401);

    let missing = guard.analyze("", "hi", &options).await.unwrap_err();
    match missing.kind() {
        TextGuardErrorKind::Auth(e) => assert_eq!(e.kind, AuthErrorKind::MissingCredential),
        other => panic!("expected auth error, got {:?}", other),
    }

    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_exhausted_quota_blocks_before_any_call() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));
    let options = AnalysisOptions::default();

    for text in ["one", "two", "three"] {
        guard.analyze(FREE_KEY, text, &options).await?;
    }
    let err = guard.analyze(FREE_KEY, "four", &options).await.unwrap_err();

    assert_eq!(transport.call_count(), 3);
    assert_eq!(err.kind().status_hint(), 429);
    match err.kind() {
        TextGuardErrorKind::Quota(e) => match &e.kind {
            QuotaErrorKind::Exceeded {
                tier,
                limit,
                requested,
                ..
            } => {
                assert_eq!(tier, "free");
                assert_eq!(*limit, 3);
                assert_eq!(*requested, 1);
            }
            other => panic!("expected quota exceeded, got {:?}", other),
        },
        other => panic!("expected quota error, got {:?}", other),
    }

    // Other tiers are unaffected.
    guard.analyze(PREMIUM_KEY, "four", &options).await?;
    Ok(())
}

#[tokio::test]
async fn test_cache_hits_still_consume_quota() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));
    let options = AnalysisOptions::default();

    guard.analyze(FREE_KEY, "same", &options).await?;
    guard.analyze(FREE_KEY, "same", &options).await?;

    assert_eq!(transport.call_count(), 1);
    let usage = guard.usage(FREE_KEY)?;
    assert_eq!(*usage.requests_today(), 2);
    assert_eq!(*usage.cache_hits(), 1);
    Ok(())
}

#[tokio::test]
async fn test_quota_window_resets_after_a_day() -> anyhow::Result<()> {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
    ));
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), clock.clone());
    let options = AnalysisOptions::default();

    for text in ["a", "b", "c"] {
        guard.analyze(FREE_KEY, text, &options).await?;
    }
    assert!(guard.analyze(FREE_KEY, "d", &options).await.is_err());

    clock.advance(chrono::Duration::hours(24) + chrono::Duration::seconds(1));

    guard.analyze(FREE_KEY, "d", &options).await?;
    assert_eq!(*guard.usage(FREE_KEY)?.requests_today(), 1);
    Ok(())
}

#[tokio::test]
async fn test_oversize_batch_is_rejected_without_reserving() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));

    let err = guard
        .analyze_batch(FREE_KEY, texts(3), &AnalysisOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind().status_hint(), 413);
    assert!(matches!(
        err.kind(),
        TextGuardErrorKind::Quota(e) if matches!(e.kind, QuotaErrorKind::BatchTooLarge { requested: 3, max: 2, .. })
    ));
    assert_eq!(transport.call_count(), 0);
    assert_eq!(*guard.usage(FREE_KEY)?.requests_today(), 0);
    Ok(())
}

#[tokio::test]
async fn test_batch_larger_than_remaining_budget_is_rejected() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));
    let options = AnalysisOptions::default();

    guard.analyze(FREE_KEY, "first", &options).await?;
    guard.analyze(FREE_KEY, "second", &options).await?;

    let err = guard
        .analyze_batch(FREE_KEY, texts(2), &options)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        TextGuardErrorKind::Quota(e) if matches!(e.kind, QuotaErrorKind::Exceeded { requested: 2, .. })
    ));
    assert_eq!(transport.call_count(), 2);
    assert_eq!(*guard.usage(FREE_KEY)?.requests_remaining(), 1);
    Ok(())
}

#[tokio::test]
async fn test_batch_returns_items_in_order() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Spam, 70% likelihood"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));
    let inputs = texts(5);

    let items = guard
        .analyze_batch(PREMIUM_KEY, inputs.clone(), &AnalysisOptions::default())
        .await?;

    assert_eq!(items.len(), 5);
    for (item, input) in items.iter().zip(&inputs) {
        assert_eq!(item.input(), input);
        assert_eq!(*item.status(), BatchStatus::Success);
        assert_eq!(*item.result().as_ref().unwrap().confidence(), 0.7);
    }
    assert_eq!(*guard.usage(PREMIUM_KEY)?.requests_today(), 5);
    Ok(())
}

#[tokio::test]
async fn test_empty_batch_consumes_nothing() -> anyhow::Result<()> {
    let transport = Arc::new(CountingTransport::new("Not spam"));
    let guard = guard_with(transport.clone(), Arc::new(SystemClock));

    let items = guard
        .analyze_batch(FREE_KEY, Vec::new(), &AnalysisOptions::default())
        .await?;

    assert!(items.is_empty());
    assert_eq!(*guard.usage(FREE_KEY)?.requests_today(), 0);
    Ok(())
}

#[tokio::test]
async fn test_tiers_are_listed_in_name_order() {
    let guard = guard_with(
        Arc::new(CountingTransport::new("Not spam")),
        Arc::new(SystemClock),
    );

    let names: Vec<_> = guard.tiers().into_iter().map(|tier| tier.name).collect();
    assert_eq!(names, vec!["free", "premium"]);
}
