// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::{Duration, Instant};
use taskflux_core::{Outcome, TaskError};
use taskflux_test_utils::{
    delayed_cancellation, delayed_failure, delayed_outcome, delayed_success, TestError,
};

#[tokio::test]
async fn test_delayed_success_waits_before_resolving() -> anyhow::Result<()> {
    let started = Instant::now();
    let operation = delayed_success(5, Duration::from_millis(30));
    assert!(!operation.is_terminal());

    let outcome = operation.await;

    assert!(matches!(outcome, Outcome::Succeeded(5)));
    assert!(started.elapsed() >= Duration::from_millis(30));
    Ok(())
}

#[tokio::test]
async fn test_delayed_failure_carries_test_error() -> anyhow::Result<()> {
    let outcome = delayed_failure::<u8>("boom", Duration::from_millis(5)).await;

    let source = match outcome {
        Outcome::Failed(TaskError::Failure(source)) => source,
        other => panic!("expected a wrapped failure, got {other:?}"),
    };
    let test_error = source
        .downcast_ref::<TestError>()
        .expect("source should be a TestError");
    assert_eq!(test_error, &TestError::injected("boom"));
    Ok(())
}

#[tokio::test]
async fn test_delayed_cancellation_is_not_a_failure() -> anyhow::Result<()> {
    let outcome = delayed_cancellation::<u8>(Duration::from_millis(5)).await;

    assert!(outcome.is_cancelled());
    assert!(!outcome.is_failed());
    Ok(())
}

#[tokio::test]
async fn test_delayed_outcome_replays_given_outcome() -> anyhow::Result<()> {
    let outcome = delayed_outcome(
        Outcome::<u8>::Failed(TaskError::contract_violation("replayed")),
        Duration::from_millis(5),
    )
    .await;

    assert!(matches!(outcome, Outcome::Failed(TaskError::ContractViolation { .. })));
    Ok(())
}
