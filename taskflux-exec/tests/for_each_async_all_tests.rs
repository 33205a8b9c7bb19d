// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use taskflux_core::{Outcome, TaskError};
use taskflux_exec::{for_each_async_all, ForEachAsyncExt};
use taskflux_test_utils::TestError;
use tokio::time::sleep;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|logged| logged == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {log:?}"))
}

#[tokio::test]
async fn test_worker_stops_at_first_failure_while_siblings_continue() -> anyhow::Result<()> {
    let log = Arc::new(Mutex::new(Vec::new()));

    let events = log.clone();
    let run = for_each_async_all(0..6, 2, move |item: u32| {
        let events = events.clone();
        async move {
            events.lock().push(format!("start {item}"));
            if item == 0 {
                return Err(TestError::injected("item 0"));
            }
            if item == 1 {
                sleep(ms(50)).await;
            }
            events.lock().push(format!("end {item}"));
            Ok(item)
        }
    })?;

    let outcome = run.await;

    // A single stopped worker surfaces its own failure, not an aggregate.
    assert_eq!(
        outcome.error().map(ToString::to_string),
        Some("Operation failed: Injected failure: item 0".to_string())
    );

    let log = log.lock().clone();
    for item in 2..6 {
        assert!(log.contains(&format!("end {item}")), "{item} not processed: {log:?}");
    }
    // Nobody but the slow sibling was left to claim item 2.
    assert!(position(&log, "end 1") < position(&log, "start 2"));
    Ok(())
}

#[tokio::test]
async fn test_every_worker_failing_leaves_the_rest_unprocessed() -> anyhow::Result<()> {
    let processed = Arc::new(AtomicUsize::new(0));

    let counter = processed.clone();
    let run = for_each_async_all(0..8, 2, move |item: u32| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            if item < 2 {
                return Err(TestError::injected(format!("item {item}")));
            }
            Ok(())
        }
    })?;

    match run.await {
        Outcome::Failed(TaskError::Aggregate { count, errors }) => {
            assert_eq!(count, 2);
            let mut messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
            messages.sort();
            assert_eq!(
                messages,
                vec![
                    "Operation failed: Injected failure: item 0",
                    "Operation failed: Injected failure: item 1",
                ]
            );
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(processed.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_succeeds_when_every_item_succeeds() -> anyhow::Result<()> {
    let processed = Arc::new(AtomicUsize::new(0));

    let counter = processed.clone();
    let run = (0..20u32).for_each_async_all(4, move |item| {
        let counter = counter.clone();
        async move {
            sleep(ms(u64::from(item % 4))).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TestError>(item)
        }
    })?;

    assert!(run.await.is_succeeded());
    assert_eq!(processed.load(Ordering::SeqCst), 20);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_item_stops_its_worker_as_cancelled() -> anyhow::Result<()> {
    let run = for_each_async_all(0..1, 1, |item: u32| async move {
        assert_ne!(item, 0, "item zero blows up");
        Ok::<_, TestError>(())
    })?;

    assert!(run.await.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_empty_source_succeeds() -> anyhow::Result<()> {
    let run = for_each_async_all(Vec::<u8>::new(), 3, |_| async { Ok::<_, TestError>(()) })?;

    assert!(run.await.is_succeeded());
    Ok(())
}

#[tokio::test]
async fn test_zero_degree_is_rejected() -> anyhow::Result<()> {
    let result = for_each_async_all(0..3, 0, |_: u8| async { Ok::<_, TestError>(()) });

    assert!(matches!(result, Err(TaskError::ContractViolation { .. })));
    Ok(())
}
