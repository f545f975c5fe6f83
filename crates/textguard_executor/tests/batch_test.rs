//! Ordering, isolation and cancellation of batch runs.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockReply, MockTransport, executor_with};
use textguard_core::AnalysisOptions;
use textguard_error::TextGuardErrorKind;
use textguard_executor::{BatchOrchestrator, BatchStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn inputs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_slow_middle_item_keeps_its_position() {
    let transport = Arc::new(MockTransport::from_fn(|text, _| {
        let reply = MockReply::ok(&format!("Not spam: {}", text));
        if text == "second" {
            reply.after(Duration::from_secs(5))
        } else {
            reply
        }
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport.clone()));

    let items = orchestrator
        .run_batch(inputs(&["first", "second", "third"]), &AnalysisOptions::default())
        .await;

    assert_eq!(items.len(), 3);
    for (position, (item, expected)) in items.iter().zip(["first", "second", "third"]).enumerate() {
        assert_eq!(*item.index(), position);
        assert_eq!(item.input(), expected);
        assert_eq!(*item.status(), BatchStatus::Success);
        let result = item.result().as_ref().expect("successful item has a result");
        assert_eq!(result.text(), expected);
        assert!(result.analysis().ends_with(expected));
    }
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failure_stays_in_its_slot() {
    let transport = Arc::new(MockTransport::from_fn(|text, _| match text {
        "b" => MockReply::status(400, "rejected"),
        _ => MockReply::ok("This is spam, 80% confidence"),
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport));

    let items = orchestrator
        .run_batch(inputs(&["a", "b"]), &AnalysisOptions::default())
        .await;

    assert_eq!(*items[0].status(), BatchStatus::Success);
    assert!(items[0].error().is_none());
    assert_eq!(*items[0].result().as_ref().map(|r| r.confidence()).unwrap(), 0.8);

    assert_eq!(*items[1].status(), BatchStatus::Error);
    assert!(items[1].result().is_none());
    let err = items[1].error().as_ref().expect("failed item keeps its error");
    assert!(matches!(err.kind(), TextGuardErrorKind::Upstream(_)));
}

#[tokio::test(start_paused = true)]
async fn test_items_run_concurrently() {
    let transport = Arc::new(MockTransport::always(
        MockReply::ok("Not spam").after(Duration::from_secs(5)),
    ));
    let orchestrator = BatchOrchestrator::new(executor_with(transport.clone()));
    let texts: Vec<String> = (0..10).map(|i| format!("message {}", i)).collect();

    let started = Instant::now();
    let items = orchestrator.run_batch(texts, &AnalysisOptions::default()).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(items.iter().all(|item| item.is_success()));
    assert_eq!(transport.call_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_marks_unfinished_items() {
    let transport = Arc::new(MockTransport::from_fn(|text, _| match text {
        "quick" => MockReply::ok("Not spam"),
        _ => MockReply::ok("Not spam").after(Duration::from_secs(60)),
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let items = orchestrator
        .run_batch_with_cancel(
            inputs(&["quick", "slow one", "slow two"]),
            &AnalysisOptions::default(),
            &cancel,
        )
        .await;

    let statuses: Vec<_> = items.iter().map(|item| *item.status()).collect();
    assert_eq!(
        statuses,
        vec![
            BatchStatus::Success,
            BatchStatus::Cancelled,
            BatchStatus::Cancelled,
        ]
    );
    assert!(matches!(
        items[1].error().as_ref().map(|e| e.kind()),
        Some(TextGuardErrorKind::Cancelled(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cancels_stragglers() {
    let transport = Arc::new(MockTransport::from_fn(|text, _| match text {
        "slow" => MockReply::ok("Not spam").after(Duration::from_secs(60)),
        _ => MockReply::ok("Not spam").after(Duration::from_secs(1)),
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport));

    let started = Instant::now();
    let items = orchestrator
        .run_batch_with_deadline(
            inputs(&["fast", "slow"]),
            &AnalysisOptions::default(),
            Duration::from_secs(5),
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(*items[0].status(), BatchStatus::Success);
    assert_eq!(*items[1].status(), BatchStatus::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_item_becomes_error_slot() {
    let transport = Arc::new(MockTransport::from_fn(|text, _| {
        if text == "boom" {
            panic!("responder blew up");
        }
        MockReply::ok("Not spam")
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport));

    let items = orchestrator
        .run_batch(inputs(&["before", "boom", "after"]), &AnalysisOptions::default())
        .await;

    assert_eq!(items.len(), 3);
    assert!(items[0].is_success());
    assert!(items[2].is_success());

    assert_eq!(*items[1].status(), BatchStatus::Error);
    assert!(items[1].result().is_none());
    let err = items[1].error().as_ref().expect("panicked item keeps an error");
    assert!(matches!(err.kind(), TextGuardErrorKind::Batch(_)));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_batch_cancels_in_flight_items() {
    let transport = Arc::new(MockTransport::always(
        MockReply::ok("Not spam").after(Duration::from_secs(60)),
    ));
    let executor = executor_with(transport.clone());
    let orchestrator = BatchOrchestrator::new(executor.clone());

    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        orchestrator.run_batch(inputs(&["one", "two"]), &AnalysisOptions::default()),
    )
    .await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(transport.call_count(), 2);
    assert!(executor.cache().is_empty());
}

#[tokio::test]
async fn test_empty_batch() {
    let transport = Arc::new(MockTransport::always(MockReply::ok("Not spam")));
    let orchestrator = BatchOrchestrator::new(executor_with(transport.clone()));

    let items = orchestrator
        .run_batch(Vec::new(), &AnalysisOptions::default())
        .await;

    assert!(items.is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_batch_items_serialize_with_status() -> anyhow::Result<()> {
    let transport = Arc::new(MockTransport::from_fn(|text, _| match text {
        "bad" => MockReply::status(422, "unprocessable"),
        _ => MockReply::ok("This is spam"),
    }));
    let orchestrator = BatchOrchestrator::new(executor_with(transport));

    let items = orchestrator
        .run_batch(inputs(&["good", "bad"]), &AnalysisOptions::default())
        .await;
    let json = serde_json::to_value(&items)?;

    assert_eq!(json[0]["status"], "success");
    assert_eq!(json[0]["result"]["is_spam"], true);
    assert!(json[0].get("error").is_none());
    assert_eq!(json[1]["status"], "error");
    assert!(json[1]["error"].as_str().unwrap().contains("422"));
    Ok(())
}
